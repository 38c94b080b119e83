//! Structural validation of responses against a compiled schema.

use serde_json::Value;
use thiserror::Error;

use crate::schema::{Schema, SchemaNode, ValueKind};
use crate::variables::render;

/// Why a value failed to match its schema. Every variant carries the
/// dot-joined path of the offending property.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required property is absent.
    #[error("missing property '{path}'")]
    MissingProperty {
        /// Property path.
        path: String,
    },

    /// An array schema met something that is not an array.
    #[error("property '{path}' is not an array")]
    NotAnArray {
        /// Property path.
        path: String,
    },

    /// An item of an array failed the element schema.
    #[error("item {index} of '{path}' does not match the array schema: {reason}")]
    ArrayElementMismatch {
        /// Path of the array.
        path: String,
        /// Index of the first failing item.
        index: usize,
        /// The item's own failure.
        reason: String,
    },

    /// A value does not match its type, pattern or literal.
    #[error("property '{path}' expected {expected}, found {actual}")]
    TypeMismatch {
        /// Property path.
        path: String,
        /// Description of the expected node.
        expected: String,
        /// The offending value.
        actual: String,
    },
}

impl ValidationError {
    /// Returns the path the failure refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingProperty { path }
            | Self::NotAnArray { path }
            | Self::ArrayElementMismatch { path, .. }
            | Self::TypeMismatch { path, .. } => path,
        }
    }
}

/// Result of a validation.
pub type ValidationResult = Result<(), ValidationError>;

/// Compares `actual` against `schema`, walking properties in declaration
/// order and stopping at the first failure. An empty schema always passes.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn compare(schema: &Schema, actual: &Value) -> ValidationResult {
    compare_at(schema, actual, "")
}

/// Tests a single value against a type, pattern or literal node.
///
/// Object and array nodes never match here; they are structural and handled
/// by [`compare`].
#[must_use]
pub fn is_value(node: &SchemaNode, value: &Value) -> bool {
    match node {
        SchemaNode::Type(kind) => ValueKind::of(value) == *kind,
        SchemaNode::Pattern(re) => re.is_match(&render(value)),
        SchemaNode::Literal(expected) => literal_eq(expected, value),
        SchemaNode::Object(_) | SchemaNode::Array(_) => false,
    }
}

/// Strict equality, except that numbers compare by numeric value so `200`
/// matches `200.0`.
fn literal_eq(expected: &Value, value: &Value) -> bool {
    match (expected, value) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            a.as_f64() == b.as_f64()
        }
        _ => expected == value,
    }
}

fn compare_at(schema: &Schema, actual: &Value, parent: &str) -> ValidationResult {
    for (key, node) in schema.iter() {
        let path = join(parent, key);
        match (node, actual.get(key)) {
            (SchemaNode::Array(_), None) => return Err(ValidationError::NotAnArray { path }),
            (_, None) => return Err(ValidationError::MissingProperty { path }),
            (node, Some(value)) => check(node, value, &path)?,
        }
    }
    Ok(())
}

fn check(node: &SchemaNode, value: &Value, path: &str) -> ValidationResult {
    match (node, value) {
        (SchemaNode::Array(element), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                check(element, item, &join(path, &index.to_string())).map_err(|err| {
                    ValidationError::ArrayElementMismatch {
                        path: path.to_string(),
                        index,
                        reason: err.to_string(),
                    }
                })?;
            }
            Ok(())
        }
        (SchemaNode::Array(_), _) => Err(ValidationError::NotAnArray {
            path: path.to_string(),
        }),
        (SchemaNode::Object(schema), Value::Object(_)) => compare_at(schema, value, path),
        (node, value) if is_value(node, value) => Ok(()),
        (node, value) => Err(ValidationError::TypeMismatch {
            path: path.to_string(),
            expected: node.describe(),
            actual: value.to_string(),
        }),
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(descriptor: Value) -> Schema {
        Schema::from_descriptor(&descriptor).unwrap()
    }

    #[test]
    fn test_compare_flat_types() {
        let s = schema(json!({"name": "String", "age": "Number"}));
        assert_eq!(compare(&s, &json!({"name": "tom", "age": 12})), Ok(()));
    }

    #[test]
    fn test_compare_nested_object() {
        let s = schema(json!({
            "name": "String",
            "friend": {"name": "String", "age": "Number"}
        }));
        let actual = json!({"name": "tom", "friend": {"name": "Gary", "age": 11}});
        assert_eq!(compare(&s, &actual), Ok(()));
    }

    #[test]
    fn test_type_mismatch() {
        let s = schema(json!({"name": "String"}));
        assert_eq!(
            compare(&s, &json!({"name": 1})),
            Err(ValidationError::TypeMismatch {
                path: "name".to_string(),
                expected: "String".to_string(),
                actual: "1".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_nested_property_path() {
        let s = schema(json!({"user": {"profile": {"email": "String"}}}));
        let err = compare(&s, &json!({"user": {"profile": {}}})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingProperty {
                path: "user.profile.email".to_string()
            }
        );
    }

    #[test]
    fn test_falsy_values_are_present() {
        let s = schema(json!({"count": 0, "error": false, "name": "", "gone": "Null"}));
        let actual = json!({"count": 0, "error": false, "name": "", "gone": null});
        assert_eq!(compare(&s, &actual), Ok(()));
    }

    #[test]
    fn test_array_of_types() {
        let s = schema(json!({"nums": ["Number"]}));
        assert_eq!(compare(&s, &json!({"nums": [1, 2, 3]})), Ok(()));
        assert_eq!(compare(&s, &json!({"nums": []})), Ok(()));

        let err = compare(&s, &json!({"nums": [1, "2"]})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ArrayElementMismatch { ref path, index: 1, .. } if path == "nums"
        ));
    }

    #[test]
    fn test_array_of_objects() {
        let s = schema(json!({"persons": [{"name": "String"}]}));
        let actual = json!({"persons": [{"name": "Tom", "age": 12}, {"name": "Adrian"}]});
        assert_eq!(compare(&s, &actual), Ok(()));

        let err = compare(&s, &json!({"persons": [{"name": "Tom"}, {"age": 3}]})).unwrap_err();
        match err {
            ValidationError::ArrayElementMismatch { path, index, reason } => {
                assert_eq!(path, "persons");
                assert_eq!(index, 1);
                assert!(reason.contains("persons.1.name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_an_array() {
        let s = schema(json!({"list": [{"name": "String"}]}));
        assert_eq!(
            compare(&s, &json!({"list": "x"})),
            Err(ValidationError::NotAnArray {
                path: "list".to_string()
            })
        );
        assert_eq!(
            compare(&s, &json!({})),
            Err(ValidationError::NotAnArray {
                path: "list".to_string()
            })
        );
    }

    #[test]
    fn test_patterns_and_literals() {
        let s = schema(json!({
            "session": "/^[0-9a-f]{4}$/",
            "id": "/\\d+/",
            "meta": {"code": 200, "error": false}
        }));
        let actual = json!({"session": "beef", "id": 42, "meta": {"code": 200, "error": false}});
        assert_eq!(compare(&s, &actual), Ok(()));

        let bad = json!({"session": "beef", "id": 42, "meta": {"code": 500, "error": false}});
        assert_eq!(compare(&s, &bad).unwrap_err().path(), "meta.code");
    }

    #[test]
    fn test_empty_schema_passes() {
        assert_eq!(compare(&Schema::new(), &json!("anything")), Ok(()));
        assert_eq!(compare(&Schema::new(), &Value::Null), Ok(()));
    }

    #[test]
    fn test_is_value() {
        assert!(is_value(&SchemaNode::string(), &json!("string")));
        assert!(is_value(&ValueKind::Array.into(), &json!([])));
        assert!(is_value(&ValueKind::Object.into(), &json!({})));
        assert!(is_value(&SchemaNode::boolean(), &json!(true)));
        assert!(is_value(&SchemaNode::number(), &json!(1)));
        assert!(!is_value(&SchemaNode::boolean(), &json!(1)));
        assert!(is_value(&SchemaNode::literal("tom"), &json!("tom")));
        assert!(!is_value(&SchemaNode::literal(1), &json!("1")));
    }

    #[test]
    fn test_numeric_literal_ignores_representation() {
        assert!(is_value(&SchemaNode::literal(200), &json!(200.0)));
        assert!(is_value(&SchemaNode::literal(1.5), &json!(1.5)));
        assert!(!is_value(&SchemaNode::literal(200), &json!(201.5)));
        assert!(!is_value(&SchemaNode::literal(200), &json!("200")));

        let s = schema(json!({"code": 200}));
        assert_eq!(compare(&s, &json!({"code": 200.0})), Ok(()));
    }

    #[test]
    fn test_object_schema_against_scalar() {
        let s = schema(json!({"friend": {"name": "String"}}));
        assert!(matches!(
            compare(&s, &json!({"friend": "gary"})),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }
}
