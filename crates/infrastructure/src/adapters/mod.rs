//! Adapters implementing the application ports.

mod reqwest_transport;

pub use reqwest_transport::{FORM_CONTENT_TYPE, ReqwestTransport};
