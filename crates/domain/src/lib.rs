//! Wrestle Domain - Core engine types
//!
//! This crate defines the pieces of the API test engine that need no I/O:
//! the variable store and its `:name` templating, the cookie jar, nested
//! query-string encoding, schema trees with their wildcard registry, and
//! the structural validator.

pub mod cookie;
pub mod error;
pub mod request;
pub mod schema;
pub mod testing;
pub mod validation;
pub mod variables;

pub use cookie::{COOKIE_VARIABLE, CookieJar};
pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, query_string, to_url};
pub use schema::{Namespace, Schema, SchemaNode, SchemaRegistry, SchemaScope, ValueKind};
pub use testing::{Selection, TestSpec};
pub use validation::{ValidationError, ValidationResult, compare, is_value};
pub use variables::{Placeholder, URL_VARIABLE, VariableStore, parse_placeholders};
