//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the engine and external systems.
//! Adapters in the infrastructure layer implement them.

mod transport;

pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
