//! Transport port
//!
//! The engine never touches the network itself. A transport receives a
//! fully prepared request and returns the status, headers and parsed body.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use wrestle_domain::HttpMethod;

/// Transport-level failures. Schema mismatches are never reported here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server refused the connection.
    #[error("cannot reach server {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The response body is not valid JSON.
    #[error("invalid JSON response: {0}")]
    MalformedBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Absolute URL (without encoded data).
    pub url: String,
    /// Request method.
    pub method: HttpMethod,
    /// Request headers, in insertion order.
    pub headers: IndexMap<String, String>,
    /// Expanded parameters. Empty when the test sends none.
    pub data: Map<String, Value>,
}

impl TransportRequest {
    /// Returns a header value, matching the name case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers; repeated headers appear once per value.
    pub headers: Vec<(String, String)>,
    /// Parsed JSON body (`null` for an empty body).
    pub body: Value,
}

impl TransportResponse {
    /// Creates a response without headers.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Adds a header (builder style).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Iterates every value of a header, matching the name case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Port for performing HTTP exchanges.
///
/// Implementations own timeouts and body encoding; the engine awaits one
/// call at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the parsed response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for connection failures, timeouts or a
    /// body that cannot be parsed.
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}
