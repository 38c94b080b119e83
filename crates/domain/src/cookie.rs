//! Cookie jar kept inside the variable store.
//!
//! Only the `name=value` pair of each `Set-Cookie` header is kept; attributes
//! such as `Path` or `Expires` are ignored. The merged jar lives in the store
//! under [`COOKIE_VARIABLE`] as a single `a=1;b=2` string, so tests can read
//! or reset it like any other variable.

use indexmap::IndexMap;

use crate::variables::VariableStore;

/// Reserved variable holding the serialized cookie string.
pub const COOKIE_VARIABLE: &str = "cookie";

/// Ordered cookie name to value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: IndexMap<String, String>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a serialized `a=1;b=2` cookie string. Malformed pairs are skipped.
    #[must_use]
    pub fn parse(serialized: &str) -> Self {
        let cookies = serialized
            .split(';')
            .filter_map(split_pair)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self { cookies }
    }

    /// Merges the `name=value` pair preceding the first `;` of a raw
    /// `Set-Cookie` header value. Returns false if no pair was found.
    pub fn set_cookie(&mut self, raw: &str) -> bool {
        let first = raw.split(';').next().unwrap_or_default();
        match split_pair(first) {
            Some((name, value)) => {
                self.cookies.insert(name.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    /// Returns the value of a cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns the number of cookies held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Serializes the jar for a `Cookie` request header.
    #[must_use]
    pub fn to_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl VariableStore {
    /// Returns the jar currently serialized in the store.
    #[must_use]
    pub fn cookie_jar(&self) -> CookieJar {
        self.retrieve_str(COOKIE_VARIABLE)
            .map(CookieJar::parse)
            .unwrap_or_default()
    }

    /// Merges one raw `Set-Cookie` value into the stored jar.
    pub fn set_cookie(&mut self, raw: &str) {
        let mut jar = self.cookie_jar();
        if jar.set_cookie(raw) {
            self.define(COOKIE_VARIABLE, jar.to_header());
        }
    }

    /// Returns the serialized cookie string, if any cookie was stored.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.retrieve_str(COOKIE_VARIABLE).filter(|s| !s.is_empty())
    }
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}
