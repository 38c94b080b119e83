//! Schema registry and compiler
//!
//! Fragments are registered per namespace under a `(method, status)` scope
//! where either part may be the `*` wildcard. Compiling for a concrete test
//! layers the matching tiers from least to most specific.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::Schema;
use crate::request::HttpMethod;

/// Independent schema spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Default request parameters.
    Request,
    /// Expected response body shape.
    Response,
    /// Default request headers.
    Headers,
}

impl Namespace {
    /// Returns the namespace name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Headers => "headers",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(method, status)` part of a registry key. `None` is the `*` wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaScope {
    /// Request method, or any.
    #[serde(default)]
    pub method: Option<HttpMethod>,
    /// Response status, or any.
    #[serde(default)]
    pub status: Option<u16>,
}

impl SchemaScope {
    /// The `*.*` scope.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            method: None,
            status: None,
        }
    }

    /// Scope for one method and any status.
    #[must_use]
    pub const fn method(method: HttpMethod) -> Self {
        Self {
            method: Some(method),
            status: None,
        }
    }

    /// Scope for any method and one status.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            method: None,
            status: Some(status),
        }
    }

    /// Narrows the scope to a method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Narrows the scope to a status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for SchemaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            Some(method) => f.write_str(method.as_key())?,
            None => f.write_str("*")?,
        }
        match self.status {
            Some(status) => write!(f, ".{status}"),
            None => f.write_str(".*"),
        }
    }
}

/// Registered schema fragments keyed by namespace and scope.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: HashMap<(Namespace, SchemaScope), Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fragment. A fragment registered under an existing key is
    /// shallow-merged over the stored one.
    pub fn register(&mut self, namespace: Namespace, scope: SchemaScope, fragment: Schema) -> &Schema {
        let entry = self.entries.entry((namespace, scope)).or_default();
        entry.merge(&fragment);
        entry
    }

    /// Returns the fragment stored under an exact key.
    #[must_use]
    pub fn get(&self, namespace: Namespace, scope: SchemaScope) -> Option<&Schema> {
        self.entries.get(&(namespace, scope))
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compiles the schema applying to a test.
    ///
    /// Tiers are merged in the order `*.*`, `method.*`, `*.status`,
    /// `method.status`; later tiers overwrite conflicting top-level
    /// properties. Without a status only the first two tiers apply.
    #[must_use]
    pub fn compile(&self, namespace: Namespace, method: HttpMethod, status: Option<u16>) -> Schema {
        let mut tiers = vec![SchemaScope::any(), SchemaScope::method(method)];
        if let Some(status) = status {
            tiers.push(SchemaScope::status(status));
            tiers.push(SchemaScope::method(method).with_status(status));
        }

        let mut compiled = Schema::new();
        for scope in tiers {
            if let Some(fragment) = self.get(namespace, scope) {
                compiled.merge(fragment);
            }
        }
        compiled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn fragment(value: Value) -> Schema {
        Schema::from_descriptor(&value).unwrap()
    }

    fn rendered(schema: &Schema) -> Value {
        Value::Object(schema.to_map())
    }

    #[test]
    fn test_register_merges_same_key() {
        let mut registry = SchemaRegistry::new();
        registry.register(Namespace::Response, SchemaScope::any(), fragment(json!({"a": "String"})));
        registry.register(Namespace::Response, SchemaScope::any(), fragment(json!({"b": "String"})));

        let stored = registry.get(Namespace::Response, SchemaScope::any()).unwrap();
        assert_eq!(rendered(stored), json!({"a": "String", "b": "String"}));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut registry = SchemaRegistry::new();
        registry.register(Namespace::Request, SchemaScope::any(), fragment(json!({"key": "abc"})));

        let compiled = registry.compile(Namespace::Response, HttpMethod::Get, Some(200));
        assert!(compiled.is_empty());
    }

    #[test]
    fn test_compile_precedence() {
        let mut registry = SchemaRegistry::new();
        let ns = Namespace::Response;
        registry.register(ns, SchemaScope::any(), fragment(json!({"a": 1})));
        registry.register(ns, SchemaScope::method(HttpMethod::Post), fragment(json!({"b": 2})));
        registry.register(ns, SchemaScope::status(200), fragment(json!({"c": 3})));
        registry.register(
            ns,
            SchemaScope::method(HttpMethod::Post).with_status(200),
            fragment(json!({"a": 9})),
        );

        let compiled = registry.compile(ns, HttpMethod::Post, Some(200));
        assert_eq!(rendered(&compiled), json!({"a": 9, "b": 2, "c": 3}));
    }

    #[test]
    fn test_compile_skips_other_tiers() {
        let mut registry = SchemaRegistry::new();
        let ns = Namespace::Response;
        registry.register(ns, SchemaScope::method(HttpMethod::Get), fragment(json!({"get": true})));
        registry.register(ns, SchemaScope::status(404), fragment(json!({"error": true})));
        registry.register(ns, SchemaScope::any(), fragment(json!({"ok": true})));

        let compiled = registry.compile(ns, HttpMethod::Post, Some(200));
        assert_eq!(rendered(&compiled), json!({"ok": true}));

        let compiled = registry.compile(ns, HttpMethod::Get, None);
        assert_eq!(rendered(&compiled), json!({"ok": true, "get": true}));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(SchemaScope::any().to_string(), "*.*");
        assert_eq!(
            SchemaScope::method(HttpMethod::Post).with_status(200).to_string(),
            "post.200"
        );
        assert_eq!(SchemaScope::status(404).to_string(), "*.404");
    }
}
