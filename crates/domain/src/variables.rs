//! Variable store and `:name` templating
//!
//! Paths and parameters reference stored variables with a leading colon,
//! e.g. `/user/:id`. Values are kept as JSON so callbacks can stash whole
//! response fragments and later tests can reuse them.

use std::collections::HashMap;
use std::ops::Range;

use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Reserved variable holding the base URL of the API under test.
pub const URL_VARIABLE: &str = "url";

/// A `:name` reference found in a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The variable name (without the colon).
    pub name: String,
    /// Byte range of `:name` in the original string.
    pub span: Range<usize>,
}

/// Finds every `:identifier` placeholder in `input`.
///
/// An identifier starts with an ASCII letter or underscore, so `:8080` in a
/// host name is left alone.
#[must_use]
pub fn parse_placeholders(input: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b':' {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        if end < bytes.len() && (bytes[end].is_ascii_alphabetic() || bytes[end] == b'_') {
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            found.push(Placeholder {
                name: input[start + 1..end].to_string(),
                span: start..end,
            });
            i = end;
        } else {
            i += 1;
        }
    }

    found
}

/// Mutable name-to-value map shared by every test of a suite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    values: HashMap<String, Value>,
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any previous value.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Stores every entry of `values`.
    pub fn define_all<I, K>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in values {
            self.define(name, value);
        }
    }

    /// Returns the stored value, or `None` when `name` was never defined.
    #[must_use]
    pub fn retrieve(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the stored value as a string slice if it is a JSON string.
    #[must_use]
    pub fn retrieve_str(&self, name: &str) -> Option<&str> {
        self.retrieve(name).and_then(Value::as_str)
    }

    /// Returns the number of stored variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every `:name` in `template` with the stored value.
    ///
    /// String values are inserted verbatim, anything else as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UndefinedVariable`] naming the first
    /// placeholder without a stored value.
    pub fn format(&self, template: &str) -> DomainResult<String> {
        let placeholders = parse_placeholders(template);
        if placeholders.is_empty() {
            return Ok(template.to_string());
        }

        let mut out = String::with_capacity(template.len());
        let mut last_end = 0;
        for placeholder in &placeholders {
            out.push_str(&template[last_end..placeholder.span.start]);
            out.push_str(&render(self.lookup(&placeholder.name)?));
            last_end = placeholder.span.end;
        }
        out.push_str(&template[last_end..]);

        Ok(out)
    }

    /// Formats a single JSON leaf. Non-string values pass through unchanged;
    /// a string that is exactly one placeholder keeps the stored value's type.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UndefinedVariable`] for unknown placeholders.
    pub fn format_value(&self, value: &Value) -> DomainResult<Value> {
        let Value::String(template) = value else {
            return Ok(value.clone());
        };

        let placeholders = parse_placeholders(template);
        if let [only] = placeholders.as_slice()
            && only.span == (0..template.len())
        {
            return self.lookup(&only.name).cloned();
        }

        self.format(template).map(Value::String)
    }

    /// Recursively formats every leaf of a nested object/array structure.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UndefinedVariable`] for the first unknown
    /// placeholder met in depth-first order.
    pub fn expand(&self, node: &Value) -> DomainResult<Value> {
        match node {
            Value::Object(map) => {
                let mut expanded = Map::with_capacity(map.len());
                for (key, child) in map {
                    expanded.insert(key.clone(), self.expand(child)?);
                }
                Ok(Value::Object(expanded))
            }
            Value::Array(items) => items
                .iter()
                .map(|child| self.expand(child))
                .collect::<DomainResult<Vec<_>>>()
                .map(Value::Array),
            leaf => self.format_value(leaf),
        }
    }

    fn lookup(&self, name: &str) -> DomainResult<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| DomainError::UndefinedVariable(name.to_string()))
    }
}

/// Renders a value the way it appears inside a formatted string.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
