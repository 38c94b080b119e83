//! Declared test cases and run selections.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::request::HttpMethod;
use crate::schema::Schema;

/// The declared part of a test case: what to send and what to expect.
#[derive(Debug, Clone, Default)]
pub struct TestSpec {
    /// Request method.
    pub method: HttpMethod,
    /// Path relative to the base URL; may contain `:name` placeholders.
    pub path: String,
    /// Request parameters; leaves may contain placeholders.
    pub params: Map<String, Value>,
    /// Free-form description shown by presenters.
    pub description: Option<String>,
    /// Expected HTTP status, if any.
    pub expected_status: Option<u16>,
    /// Per-test response fragment, merged over the registry schema.
    pub schema: Option<Schema>,
}

impl TestSpec {
    /// Creates a spec for `method path`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// One-line label such as `POST /user`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Which queued tests a run executes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Every test.
    #[default]
    All,
    /// A single test by index.
    Index(usize),
    /// An inclusive index range.
    Range {
        /// First index.
        lo: usize,
        /// Last index (inclusive).
        hi: usize,
    },
    /// An explicit set of indices.
    Indices(BTreeSet<usize>),
}

impl Selection {
    /// Builds an index-set selection.
    pub fn indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::Indices(indices.into_iter().collect())
    }

    /// Returns true if the test at `index` is selected.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::All => true,
            Self::Index(i) => *i == index,
            Self::Range { lo, hi } => (*lo..=*hi).contains(&index),
            Self::Indices(set) => set.contains(&index),
        }
    }

    /// Returns the selected indices of a queue of `len` tests, in queue order.
    /// Indices past the end of the queue are ignored.
    #[must_use]
    pub fn apply(&self, len: usize) -> Vec<usize> {
        (0..len).filter(|i| self.contains(*i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selection_all() {
        assert_eq!(Selection::All.apply(3), vec![0, 1, 2]);
    }

    #[test]
    fn test_selection_single_and_range() {
        assert_eq!(Selection::Index(1).apply(3), vec![1]);
        assert_eq!(Selection::Index(7).apply(3), Vec::<usize>::new());
        assert_eq!(Selection::Range { lo: 1, hi: 3 }.apply(5), vec![1, 2, 3]);
        assert_eq!(Selection::Range { lo: 3, hi: 9 }.apply(5), vec![3, 4]);
    }

    #[test]
    fn test_selection_indices_keep_queue_order() {
        assert_eq!(Selection::indices([4, 0, 2]).apply(5), vec![0, 2, 4]);
    }

    #[test]
    fn test_label() {
        let spec = TestSpec::new(HttpMethod::Delete, "/user/:id");
        assert_eq!(spec.label(), "DELETE /user/:id");
    }
}
