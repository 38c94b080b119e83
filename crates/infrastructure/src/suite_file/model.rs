//! Declarative suite file format.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use wrestle_application::SuiteConfig;
use wrestle_domain::Namespace;

/// A whole suite declared in YAML or JSON.
///
/// ```yaml
/// config:
///   base_url: http://localhost:8181
/// variables:
///   password: hunter2
/// schemas:
///   - namespace: response
///     method: post
///     status: 200
///     schema: { id: Number }
/// tests:
///   - method: post
///     path: /login
///     params: { user: tom, password: ":password" }
///     expect:
///       status: 200
///       capture: { session: session.id }
///   - method: get
///     path: /user/:session
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuiteFile {
    /// Suite configuration.
    pub config: SuiteConfig,
    /// Variables defined before the run.
    pub variables: Map<String, Value>,
    /// Schema fragments, registered in order.
    pub schemas: Vec<SchemaDecl>,
    /// Tests, in execution order.
    pub tests: Vec<TestDecl>,
}

/// One registered schema fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDecl {
    /// Namespace the fragment belongs to.
    pub namespace: Namespace,
    /// Method, or `*`/absent for every method.
    #[serde(default)]
    pub method: Option<String>,
    /// Status, or absent for every status.
    #[serde(default)]
    pub status: Option<u16>,
    /// Schema descriptor.
    pub schema: Value,
}

/// One declared test.
#[derive(Debug, Clone, Deserialize)]
pub struct TestDecl {
    /// Request method.
    pub method: String,
    /// Request path; may contain placeholders.
    pub path: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Request parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Expectations.
    #[serde(default)]
    pub expect: ExpectDecl,
}

/// Expectations of a declared test.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpectDecl {
    /// Expected status.
    pub status: Option<u16>,
    /// Response schema descriptor.
    pub schema: Option<Value>,
    /// Variables to define from the response: name to dotted path.
    pub capture: IndexMap<String, String>,
}
