//! Request-side primitives: methods and query-string encoding.

mod method;
mod query;

pub use method::HttpMethod;
pub use query::{query_string, to_url};
