//! Queued test cases and their runtime outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use wrestle_domain::{TestSpec, VariableStore};

use crate::error::TestFailure;
use crate::events::{EventEmitter, EventKind, SuiteEvent};

/// What a completion callback sees once its test has been checked.
#[derive(Debug, Clone, Copy)]
pub struct Completion<'a> {
    /// Position of the test in the queue.
    pub index: usize,
    /// Failure, if the test failed.
    pub error: Option<&'a TestFailure>,
    /// Response status, if a response arrived.
    pub status: Option<u16>,
    /// Response body, if a response arrived.
    pub data: Option<&'a Value>,
}

impl Completion<'_> {
    /// Returns true if the test passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-test completion callback. It may define variables for later tests.
pub type TestCallback = Box<dyn FnMut(&Completion<'_>, &mut VariableStore) + Send>;

/// Runtime result of a test, written once by the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    /// Resolved request URL, if preparation succeeded.
    pub url: Option<String>,
    /// Response status, if a response arrived.
    pub status: Option<u16>,
    /// Response body, if a response arrived.
    pub response: Option<Value>,
    /// Failure, if any.
    pub error: Option<TestFailure>,
    /// Whether the test passed.
    pub passed: bool,
    /// When the test started.
    pub started_at: DateTime<Utc>,
    /// When the test finished.
    pub finished_at: DateTime<Utc>,
}

/// One declared HTTP interaction in the queue.
pub struct TestCase {
    pub(crate) index: usize,
    pub(crate) spec: TestSpec,
    pub(crate) callback: Option<TestCallback>,
    pub(crate) emitter: EventEmitter,
    pub(crate) outcome: Option<TestOutcome>,
}

impl TestCase {
    pub(crate) fn new(index: usize, spec: TestSpec) -> Self {
        Self {
            index,
            spec,
            callback: None,
            emitter: EventEmitter::new(),
            outcome: None,
        }
    }

    /// Position in the queue; also the execution order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The declared request and expectations.
    #[must_use]
    pub const fn spec(&self) -> &TestSpec {
        &self.spec
    }

    /// The outcome of the most recent run, if the test has run.
    #[must_use]
    pub const fn outcome(&self) -> Option<&TestOutcome> {
        self.outcome.as_ref()
    }

    /// Returns true if the test ran and passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome.as_ref().is_some_and(|o| o.passed)
    }

    /// Returns true if a completion callback is attached.
    #[must_use]
    pub const fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Registers a listener for this test's own events.
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: Fn(&SuiteEvent<'_>) + Send + Sync + 'static,
    {
        self.emitter.on(kind, listener);
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("index", &self.index)
            .field("spec", &self.spec)
            .field("callback", &self.callback.is_some())
            .field("emitter", &self.emitter)
            .field("outcome", &self.outcome)
            .finish()
    }
}
