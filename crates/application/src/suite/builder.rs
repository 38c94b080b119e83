//! Fluent test declaration.

use serde_json::{Map, Value};
use wrestle_domain::{Schema, VariableStore};

use super::test_case::{Completion, TestCallback, TestCase};
use crate::events::{EventKind, SuiteEvent};

/// Named expectations for a test. Every field is optional.
#[derive(Default)]
pub struct Expectation {
    /// Expected HTTP status.
    pub status: Option<u16>,
    /// Response fragment merged over the compiled response schema.
    pub schema: Option<Schema>,
    /// Completion callback.
    pub callback: Option<TestCallback>,
}

impl Expectation {
    /// Creates an empty expectation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a status code.
    #[must_use]
    pub const fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expects a response shape.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Runs `callback` when the test completes.
    #[must_use]
    pub fn then<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Completion<'_>, &mut VariableStore) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expectation")
            .field("status", &self.status)
            .field("schema", &self.schema)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Configures a test that is already queued.
///
/// The test takes its queue slot when the builder is created, so dropping
/// the builder early still leaves a runnable test behind.
#[derive(Debug)]
pub struct TestBuilder<'a> {
    case: &'a mut TestCase,
}

impl<'a> TestBuilder<'a> {
    pub(crate) const fn new(case: &'a mut TestCase) -> Self {
        Self { case }
    }

    /// Replaces the request parameters. Only objects are accepted; any
    /// other value is ignored with a warning.
    pub fn params(self, params: impl Into<Value>) -> Self {
        match params.into() {
            Value::Object(map) => self.case.spec.params = map,
            other => tracing::warn!(
                test = self.case.index,
                "ignoring non-object params: {other}"
            ),
        }
        self
    }

    /// Sets a single request parameter.
    pub fn param(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.case.spec.params.insert(name.into(), value.into());
        self
    }

    /// Replaces the request parameters with an existing map.
    pub fn params_map(self, params: Map<String, Value>) -> Self {
        self.case.spec.params = params;
        self
    }

    /// Sets the description shown by presenters.
    pub fn describe(self, description: impl Into<String>) -> Self {
        self.case.spec.description = Some(description.into());
        self
    }

    /// Applies every field set on `expectation`.
    pub fn expect(self, expectation: Expectation) -> Self {
        let Expectation {
            status,
            schema,
            callback,
        } = expectation;
        if status.is_some() {
            self.case.spec.expected_status = status;
        }
        if schema.is_some() {
            self.case.spec.schema = schema;
        }
        if callback.is_some() {
            self.case.callback = callback;
        }
        self
    }

    /// Expects a status code.
    pub fn expect_status(self, status: u16) -> Self {
        self.case.spec.expected_status = Some(status);
        self
    }

    /// Expects a response shape.
    pub fn expect_schema(self, schema: Schema) -> Self {
        self.case.spec.schema = Some(schema);
        self
    }

    /// Runs `callback` when the test completes.
    pub fn then<F>(self, callback: F) -> Self
    where
        F: FnMut(&Completion<'_>, &mut VariableStore) + Send + 'static,
    {
        self.case.callback = Some(Box::new(callback));
        self
    }

    /// Registers a listener for this test's own events.
    pub fn on<F>(self, kind: EventKind, listener: F) -> Self
    where
        F: Fn(&SuiteEvent<'_>) + Send + Sync + 'static,
    {
        self.case.on(kind, listener);
        self
    }

    /// Finishes the declaration and returns the test's queue index.
    pub const fn compile(self) -> usize {
        self.case.index
    }
}
