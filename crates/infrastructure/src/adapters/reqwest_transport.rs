//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port. `GET`, `HEAD` and
//! `OPTIONS` requests carry their data as a query string; every other
//! method sends it as a form-urlencoded body. Responses must be JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use wrestle_application::ports::{Transport, TransportError, TransportRequest, TransportResponse};
use wrestle_domain::{HttpMethod, query_string, to_url};

/// Content type of form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(timeout_ms: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client, timeout_ms })
    }

    /// Creates a transport around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Splits a request into its final URL and optional form body.
    fn encode(request: &TransportRequest) -> Result<(Url, Option<String>), TransportError> {
        let (url, body) = if request.method.sends_query() {
            (to_url(&request.url, &request.data), None)
        } else if request.data.is_empty() {
            (request.url.clone(), None)
        } else {
            (request.url.clone(), Some(query_string(&request.data)))
        };

        let parsed =
            Url::parse(&url).map_err(|e| TransportError::InvalidUrl(format!("{e}: {url}")))?;
        Ok((parsed, body))
    }

    /// Parses a response body. An empty body is `null`.
    fn parse_body(bytes: &[u8]) -> Result<Value, TransportError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(bytes).map_err(|e| TransportError::MalformedBody(e.to_string()))
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            if message.to_lowercase().contains("refused") {
                return TransportError::ConnectionRefused {
                    host: error
                        .url()
                        .and_then(Url::host_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::Other(format!("connection failed: {message}"));
        }

        if error.is_redirect() {
            return TransportError::Other(format!("more than {MAX_REDIRECTS} redirects"));
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let (url, body) = Self::encode(request)?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(self.timeout_ms));

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = body {
            if request.header("content-type").is_none() {
                builder = builder.header("Content-Type", FORM_CONTENT_TYPE);
            }
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?;

        Ok(TransportResponse {
            status,
            headers,
            body: Self::parse_body(&bytes)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(method: HttpMethod, data: Value) -> TransportRequest {
        TransportRequest {
            url: "http://localhost:8181/user".to_string(),
            method,
            headers: IndexMap::new(),
            data: data.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(2_000).unwrap();
        assert_eq!(transport.timeout_ms(), 2_000);
    }

    #[test]
    fn test_get_data_goes_into_query() {
        let req = request(HttpMethod::Get, json!({"a": 1, "b": {"c": "x y"}}));
        let (url, body) = ReqwestTransport::encode(&req).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8181/user?a=1&b[c]=x+y");
        assert_eq!(body, None);
    }

    #[test]
    fn test_post_data_goes_into_form_body() {
        let req = request(HttpMethod::Post, json!({"name": "tom", "ids": [1, 2]}));
        let (url, body) = ReqwestTransport::encode(&req).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8181/user");
        assert_eq!(body.as_deref(), Some("name=tom&ids[0]=1&ids[1]=2"));
    }

    #[test]
    fn test_empty_post_has_no_body() {
        let req = request(HttpMethod::Delete, json!({}));
        let (_, body) = ReqwestTransport::encode(&req).unwrap();
        assert_eq!(body, None);
    }

    #[test]
    fn test_invalid_url() {
        let mut req = request(HttpMethod::Get, json!({}));
        req.url = "not a url".to_string();
        assert!(matches!(
            ReqwestTransport::encode(&req),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(
            ReqwestTransport::parse_body(br#"{"id": 1}"#).unwrap(),
            json!({"id": 1})
        );
        assert_eq!(ReqwestTransport::parse_body(b"  \n").unwrap(), Value::Null);
        assert!(matches!(
            ReqwestTransport::parse_body(b"<html>"),
            Err(TransportError::MalformedBody(_))
        ));
    }
}
