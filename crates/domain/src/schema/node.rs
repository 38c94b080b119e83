//! Schema tree types

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Run-time kind of a JSON value, matched by [`SchemaNode::Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A JSON string.
    String,
    /// A JSON number (integer or float).
    Number,
    /// `true` or `false`.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// `null`.
    Null,
}

impl ValueKind {
    /// Returns the kind of `value`.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }

    /// Returns the type name used in descriptors and messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::Null => "Null",
        }
    }

    /// Parses a type name (`"String"`, `"Number"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Number" => Some(Self::Number),
            "Boolean" => Some(Self::Boolean),
            "Object" => Some(Self::Object),
            "Array" => Some(Self::Array),
            "Null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One node of an expected-shape tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Matches any value of the given kind.
    Type(ValueKind),
    /// Matches when the value's string form matches the expression.
    Pattern(Regex),
    /// Matches a value strictly equal to this one.
    Literal(Value),
    /// Matches an object carrying every listed property.
    Object(Schema),
    /// Matches an array whose every item matches the element schema.
    Array(Box<SchemaNode>),
}

impl SchemaNode {
    /// Shorthand for `Type(ValueKind::String)`.
    #[must_use]
    pub const fn string() -> Self {
        Self::Type(ValueKind::String)
    }

    /// Shorthand for `Type(ValueKind::Number)`.
    #[must_use]
    pub const fn number() -> Self {
        Self::Type(ValueKind::Number)
    }

    /// Shorthand for `Type(ValueKind::Boolean)`.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Type(ValueKind::Boolean)
    }

    /// Builds a pattern node.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPattern`] if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> DomainResult<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| DomainError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Builds a literal node.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Builds an array node with a single element schema.
    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    /// Parses a descriptor value.
    ///
    /// Type names become [`SchemaNode::Type`], `/.../` strings become
    /// patterns, single-element arrays become array schemas and objects
    /// recurse. Everything else is a literal.
    ///
    /// # Errors
    ///
    /// Returns an error for patterns that do not compile.
    pub fn from_descriptor(descriptor: &Value) -> DomainResult<Self> {
        match descriptor {
            Value::String(s) => {
                if let Some(kind) = ValueKind::from_name(s) {
                    Ok(Self::Type(kind))
                } else if let Some(source) = pattern_source(s) {
                    Self::pattern(source)
                } else {
                    Ok(Self::Literal(descriptor.clone()))
                }
            }
            Value::Array(items) if items.len() == 1 => {
                Ok(Self::array(Self::from_descriptor(&items[0])?))
            }
            Value::Object(map) => Schema::from_map(map).map(Self::Object),
            other => Ok(Self::Literal(other.clone())),
        }
    }

    /// Short human-readable description of what this node expects.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Type(kind) => kind.name().to_string(),
            Self::Pattern(re) => format!("/{}/", re.as_str()),
            Self::Literal(value) => value.to_string(),
            Self::Object(_) => "Object".to_string(),
            Self::Array(element) => format!("[{}]", element.describe()),
        }
    }

    /// Renders the node as a plain JSON value: type markers become their
    /// names, patterns become `/source/`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Type(kind) => Value::String(kind.name().to_string()),
            Self::Pattern(re) => Value::String(format!("/{}/", re.as_str())),
            Self::Literal(value) => value.clone(),
            Self::Object(schema) => Value::Object(schema.to_map()),
            Self::Array(element) => Value::Array(vec![element.to_value()]),
        }
    }
}

impl From<ValueKind> for SchemaNode {
    fn from(kind: ValueKind) -> Self {
        Self::Type(kind)
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        Self::Object(schema)
    }
}

fn pattern_source(s: &str) -> Option<&str> {
    if s.len() >= 2 && s.starts_with('/') && s.ends_with('/') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// An object schema: property name to node, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, SchemaNode>,
}

impl Schema {
    /// Creates an empty schema, which matches any object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property and returns the schema (builder style).
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.insert(name, node);
        self
    }

    /// Sets a property, replacing any previous node for it.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<SchemaNode>) {
        self.fields.insert(name.into(), node.into());
    }

    /// Returns the node for a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.get(name)
    }

    /// Iterates properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of top-level properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shallow merge: every top-level property of `other` overwrites the
    /// same-named property here. Nested objects are replaced, not merged.
    pub fn merge(&mut self, other: &Self) {
        for (name, node) in &other.fields {
            self.fields.insert(name.clone(), node.clone());
        }
    }

    /// Parses an object descriptor (see [`SchemaNode::from_descriptor`]).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidSchema`] when `descriptor` is not an
    /// object, or a pattern error from a nested node.
    pub fn from_descriptor(descriptor: &Value) -> DomainResult<Self> {
        match descriptor {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(Self::new()),
            other => Err(DomainError::invalid_schema(
                "",
                format!("expected an object, found {}", ValueKind::of(other)),
            )),
        }
    }

    fn from_map(map: &Map<String, Value>) -> DomainResult<Self> {
        let mut schema = Self::new();
        for (name, descriptor) in map {
            schema.insert(name.clone(), SchemaNode::from_descriptor(descriptor)?);
        }
        Ok(schema)
    }

    /// Renders the schema as a JSON object (see [`SchemaNode::to_value`]).
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect()
    }
}
