//! Nested query-string encoding
//!
//! Flattens nested maps and arrays into bracketed `key[sub][0]=value` pairs,
//! the convention most form parsers understand.

use serde_json::{Map, Value};
use url::form_urlencoded::byte_serialize;

/// Encodes a parameter map as a `&`-joined query string.
///
/// Nested objects extend the key path as `parent[key]`, arrays as
/// `parent[i]`. Scalars are URL-encoded; `null` encodes as an empty value.
///
/// ```
/// use serde_json::json;
/// use wrestle_domain::request::query_string;
///
/// let params = json!({"a": 1, "b": {"r": [2, 3], "t": "hi"}});
/// let encoded = query_string(params.as_object().unwrap());
/// assert_eq!(encoded, "a=1&b[r][0]=2&b[r][1]=3&b[t]=hi");
/// ```
#[must_use]
pub fn query_string(params: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(&mut pairs, encode(key), value);
    }
    pairs.join("&")
}

/// Appends the encoded parameters to `base`, using `&` when `base` already
/// carries a query and `?` otherwise. Empty parameters leave `base` untouched.
#[must_use]
pub fn to_url(base: &str, params: &Map<String, Value>) -> String {
    let query = query_string(params);
    if query.is_empty() {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

fn push_pairs(pairs: &mut Vec<String>, path: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                push_pairs(pairs, format!("{path}[{}]", encode(key)), child);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                push_pairs(pairs, format!("{path}[{i}]"), child);
            }
        }
        Value::String(s) => pairs.push(format!("{path}={}", encode(s))),
        Value::Null => pairs.push(format!("{path}=")),
        scalar => pairs.push(format!("{path}={}", encode(&scalar.to_string()))),
    }
}

fn encode(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}
