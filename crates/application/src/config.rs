//! Suite configuration

use serde::{Deserialize, Serialize};

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("wrestle/", env!("CARGO_PKG_VERSION"));

/// Default `Accept` header value.
pub const DEFAULT_ACCEPT: &str = "application/json";

/// Default transport timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Suite-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL every test path is appended to. Seeds the `url` variable.
    pub base_url: Option<String>,
    /// `User-Agent` sent when no header schema sets one.
    pub user_agent: String,
    /// `Accept` sent when no header schema sets one.
    pub accept: String,
    /// Per-request timeout, enforced by the transport.
    pub timeout_ms: u64,
    /// What the presenter prints.
    pub display: DisplayOptions,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            display: DisplayOptions::default(),
        }
    }
}

impl SuiteConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the transport timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Presentation switches, one per kind of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DisplayOptions {
    /// Announce the start of the suite.
    pub begin: bool,
    /// Print each test's number, method and path.
    pub info: bool,
    /// Print each test's expected status and schema.
    pub expect: bool,
    /// Print each response status.
    pub response: bool,
    /// Print each response body.
    pub response_data: bool,
    /// Print passes.
    pub pass: bool,
    /// Print failures with their reason.
    pub fail: bool,
    /// Print the final summary.
    pub report: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            begin: true,
            info: true,
            expect: true,
            response: true,
            response_data: false,
            pass: true,
            fail: true,
            report: true,
        }
    }
}

impl DisplayOptions {
    /// Options that print nothing.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            begin: false,
            info: false,
            expect: false,
            response: false,
            response_data: false,
            pass: false,
            fail: false,
            report: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, None);
        assert_eq!(config.accept, "application/json");
        assert!(config.user_agent.starts_with("wrestle/"));
        assert!(config.display.report);
        assert!(!config.display.response_data);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: SuiteConfig = serde_json::from_str(
            r#"{"base_url": "http://localhost:8181", "display": {"pass": false}}"#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8181"));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!config.display.pass);
        assert!(config.display.fail);
    }
}
