//! Run reports

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use wrestle_domain::HttpMethod;

use crate::suite::TestCase;

/// Snapshot of one executed test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    /// Position in the suite queue.
    pub index: usize,
    /// Request method.
    pub method: HttpMethod,
    /// Declared path (before templating).
    pub path: String,
    /// Resolved URL, if preparation got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Test description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the test passed.
    pub pass: bool,
    /// Response status, if a response arrived.
    pub status: Option<u16>,
    /// Failure message, if the test failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response body, if a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// When the test started.
    pub started_at: DateTime<Utc>,
    /// When the test finished.
    pub finished_at: DateTime<Utc>,
}

impl TestRecord {
    /// Snapshots a test that has an outcome. Returns `None` for tests that
    /// never ran.
    #[must_use]
    pub fn from_test(test: &TestCase) -> Option<Self> {
        let outcome = test.outcome()?;
        Some(Self {
            index: test.index(),
            method: test.spec().method,
            path: test.spec().path.clone(),
            url: outcome.url.clone(),
            description: test.spec().description.clone(),
            pass: outcome.passed,
            status: outcome.status,
            error: outcome.error.as_ref().map(ToString::to_string),
            response: outcome.response.clone(),
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
        })
    }

    /// Milliseconds between start and finish.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Outcome of a suite run, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    tests: Vec<TestRecord>,
}

impl Report {
    pub(crate) fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: None,
            tests: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, record: TestRecord) {
        self.tests.push(record);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Identifier of the run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When the run began.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the run completed; `None` while it is still running or paused.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns true once the run has completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Every executed test.
    #[must_use]
    pub fn all(&self) -> &[TestRecord] {
        &self.tests
    }

    /// Tests that passed.
    pub fn passed(&self) -> impl Iterator<Item = &TestRecord> {
        self.tests.iter().filter(|t| t.pass)
    }

    /// Tests that failed.
    pub fn failed(&self) -> impl Iterator<Item = &TestRecord> {
        self.tests.iter().filter(|t| !t.pass)
    }

    /// Number of passed tests.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.passed().count()
    }

    /// Number of failed tests.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Number of executed tests.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tests.len()
    }

    /// Milliseconds from start to finish (or to now, if unfinished).
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }

    /// Builds the serializable summary.
    #[must_use]
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            run_id: self.run_id,
            passed: self.passed_count(),
            failed: self.failed_count(),
            total: self.total(),
            duration: self.duration_ms(),
            tests: ReportTests {
                passed: self.passed().collect(),
                failed: self.failed().collect(),
                all: &self.tests,
            },
        }
    }
}

/// Serializable view of a [`Report`].
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    /// Identifier of the run.
    pub run_id: Uuid,
    /// Number of passed tests.
    pub passed: usize,
    /// Number of failed tests.
    pub failed: usize,
    /// Number of executed tests.
    pub total: usize,
    /// Run duration in milliseconds.
    pub duration: i64,
    /// The executed tests.
    pub tests: ReportTests<'a>,
}

/// Test lists of a [`ReportSummary`].
#[derive(Debug, Serialize)]
pub struct ReportTests<'a> {
    /// Passed tests.
    pub passed: Vec<&'a TestRecord>,
    /// Failed tests.
    pub failed: Vec<&'a TestRecord>,
    /// All tests, in execution order.
    pub all: &'a [TestRecord],
}
