//! Expected-shape schemas: the node tree and the wildcard registry.

mod node;
mod registry;

pub use node::{Schema, SchemaNode, ValueKind};
pub use registry::{Namespace, SchemaRegistry, SchemaScope};
