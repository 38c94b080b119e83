//! Sequential run loop
//!
//! Tests execute strictly in buffer order with at most one request in
//! flight. Callbacks and cookie updates of a test are applied before the
//! next test is prepared, so a variable defined by one test is visible to
//! every later one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use wrestle_domain::variables::render;
use wrestle_domain::{DomainResult, Namespace, Selection, URL_VARIABLE, compare};

use super::test_case::{Completion, TestCase, TestOutcome};
use super::{Suite, compile_for};
use crate::error::{SuiteError, SuiteResult, TestFailure};
use crate::events::{EventEmitter, SuiteEvent};
use crate::ports::{Transport, TransportRequest, TransportResponse};
use crate::report::{Report, TestRecord};

/// Lifecycle of a suite run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    /// Never started.
    #[default]
    Idle,
    /// Dispatching tests.
    Running,
    /// Stopped before the next test; resumable.
    Paused,
    /// Every selected test ran.
    Completed,
}

/// Requests a pause from outside the run loop, e.g. from a listener.
///
/// The loop honors the request before dispatching its next test; a request
/// already in flight still completes and is recorded.
#[derive(Debug, Clone)]
pub struct PauseHandle {
    flag: Arc<AtomicBool>,
}

impl PauseHandle {
    /// Asks the running suite to pause.
    pub fn pause(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Result of one request/response exchange, before it is stored.
struct Exchange {
    url: Option<String>,
    status: Option<u16>,
    data: Option<Value>,
    error: Option<TestFailure>,
}

impl<T: Transport> Suite<T> {
    /// Returns a handle that pauses this suite from a listener or another
    /// task.
    #[must_use]
    pub fn pause_handle(&self) -> PauseHandle {
        PauseHandle {
            flag: Arc::clone(&self.pause_flag),
        }
    }

    /// Runs the selected tests in queue order.
    ///
    /// Returns the state the run stopped in: `Completed` once every selected
    /// test ran, or `Paused` if a pause was requested. Calling `begin` after
    /// an interrupted run discards it and starts over.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::BaseUrlNotDefined`] if the `url` variable is
    /// missing or empty.
    pub async fn begin(&mut self, selection: Selection) -> SuiteResult<RunState> {
        if self
            .store
            .retrieve_str(URL_VARIABLE)
            .is_none_or(str::is_empty)
        {
            return Err(SuiteError::BaseUrlNotDefined);
        }
        if self.state == RunState::Running {
            warn!(remaining = self.buffer.len(), "discarding interrupted run");
        }

        self.buffer = selection.apply(self.tests.len()).into();
        self.report = Some(Report::new());
        self.pause_flag.store(false, Ordering::SeqCst);
        self.state = RunState::Running;

        info!(tests = self.buffer.len(), "suite begin");
        self.events.emit(&SuiteEvent::Begin);

        self.run().await;
        Ok(self.state)
    }

    /// Continues a paused run with the remaining tests.
    ///
    /// A run whose future was dropped mid-request (e.g. by a timeout) is
    /// still `Running`; resuming it re-sends the interrupted test.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::NotPaused`] unless the suite is paused or was
    /// interrupted.
    pub async fn resume(&mut self) -> SuiteResult<RunState> {
        match self.state {
            RunState::Paused => info!(remaining = self.buffer.len(), "suite resumed"),
            RunState::Running => {
                warn!(remaining = self.buffer.len(), "resuming interrupted run");
            }
            RunState::Idle | RunState::Completed => return Err(SuiteError::NotPaused),
        }
        self.pause_flag.store(false, Ordering::SeqCst);
        self.state = RunState::Running;

        self.run().await;
        Ok(self.state)
    }

    /// Stops the run before its next test. Has no effect unless running.
    pub fn pause(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.state = RunState::Paused;
        info!(remaining = self.buffer.len(), "suite paused");
        self.events.emit(&SuiteEvent::Paused);
    }

    async fn run(&mut self) {
        while self.state == RunState::Running {
            if self.pause_flag.swap(false, Ordering::SeqCst) {
                self.pause();
                break;
            }
            // Popped only once recorded, so a cancelled test stays queued.
            match self.buffer.front().copied() {
                Some(index) => {
                    self.run_test(index).await;
                    self.buffer.pop_front();
                }
                None => self.complete(),
            }
        }
    }

    fn complete(&mut self) {
        self.state = RunState::Completed;
        let Some(report) = self.report.as_mut() else {
            return;
        };
        report.finish();
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            total = report.total(),
            duration_ms = report.duration_ms(),
            "suite end"
        );
        self.events.emit(&SuiteEvent::End(report));
    }

    async fn run_test(&mut self, index: usize) {
        let started_at = Utc::now();
        broadcast(&self.events, &self.tests[index], |test| SuiteEvent::Start(test));

        let exchange = match self.prepare(index) {
            Ok(request) => self.exchange(index, request).await,
            Err(e) => Exchange {
                url: None,
                status: None,
                data: None,
                error: Some(e.into()),
            },
        };

        let Exchange {
            url,
            status,
            data,
            error,
        } = exchange;

        // Callbacks see the outcome before any later test is prepared.
        let test = &mut self.tests[index];
        if let Some(callback) = test.callback.as_mut() {
            let completion = Completion {
                index,
                error: error.as_ref(),
                status,
                data: data.as_ref(),
            };
            callback(&completion, &mut self.store);
        }

        match &error {
            None => debug!(test = index, status, "test passed"),
            Some(e) => warn!(test = index, status, "test failed: {e}"),
        }

        test.outcome = Some(TestOutcome {
            url,
            status,
            passed: error.is_none(),
            response: data,
            error,
            started_at,
            finished_at: Utc::now(),
        });

        let test = &self.tests[index];
        let Some(outcome) = test.outcome() else {
            return;
        };
        broadcast(&self.events, test, |test| SuiteEvent::Finish {
            test,
            error: outcome.error.as_ref(),
            status: outcome.status,
            data: outcome.response.as_ref(),
        });
        match (&outcome.error, outcome.status, &outcome.response) {
            (None, Some(status), Some(data)) => {
                broadcast(&self.events, test, |test| SuiteEvent::Pass { test, status, data });
            }
            (Some(error), status, data) => {
                broadcast(&self.events, test, |test| SuiteEvent::Fail {
                    test,
                    error,
                    status,
                    data: data.as_ref(),
                });
            }
            // A pass always carries a response.
            (None, _, _) => {}
        }

        if let (Some(report), Some(record)) = (self.report.as_mut(), TestRecord::from_test(test)) {
            report.record(record);
        }
    }

    /// Sends the prepared request and checks the response.
    async fn exchange(&mut self, index: usize, request: TransportRequest) -> Exchange {
        debug!(test = index, method = %request.method, url = %request.url, "dispatching");
        let url = Some(request.url.clone());

        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                broadcast(&self.events, &self.tests[index], |_| SuiteEvent::Error(&e));
                return Exchange {
                    url,
                    status: None,
                    data: None,
                    error: Some(TestFailure::Transport(e)),
                };
            }
        };

        for raw in response.header_values("set-cookie") {
            self.store.set_cookie(raw);
        }

        let error = self.check(index, &response).err();
        Exchange {
            url,
            status: Some(response.status),
            data: Some(response.body),
            error,
        }
    }

    /// Checks the expected status, then the compiled response schema.
    fn check(&self, index: usize, response: &TransportResponse) -> Result<(), TestFailure> {
        let spec = &self.tests[index].spec;
        if let Some(expected) = spec.expected_status
            && expected != response.status
        {
            return Err(TestFailure::StatusMismatch {
                expected,
                actual: response.status,
            });
        }

        let schema = compile_for(&self.schemas, spec, Namespace::Response, Some(response.status));
        compare(&schema, &response.body)?;
        Ok(())
    }

    /// Templates the request of test `index`: parameters over the request
    /// schema, headers from the headers schema plus cookies and defaults,
    /// and the path joined to the base URL.
    fn prepare(&self, index: usize) -> DomainResult<TransportRequest> {
        let spec = &self.tests[index].spec;

        let mut params = self
            .schemas
            .compile(Namespace::Request, spec.method, spec.expected_status)
            .to_map();
        params.extend(spec.params.clone());
        let mut data = Map::with_capacity(params.len());
        for (name, value) in params {
            data.insert(name, self.store.expand(&value)?);
        }

        let mut headers = IndexMap::new();
        for (name, value) in self
            .schemas
            .compile(Namespace::Headers, spec.method, spec.expected_status)
            .to_map()
        {
            headers.insert(name, render(&self.store.format_value(&value)?));
        }
        if let Some(cookie) = self.store.cookie() {
            insert_absent(&mut headers, "Cookie", cookie);
        }
        insert_absent(&mut headers, "User-Agent", &self.config.user_agent);
        insert_absent(&mut headers, "Accept", &self.config.accept);

        let base = self.store.retrieve_str(URL_VARIABLE).unwrap_or_default();
        let path = self.store.format(&spec.path)?;

        Ok(TransportRequest {
            url: join_url(base, &path),
            method: spec.method,
            headers,
            data,
        })
    }
}

/// Emits an event built for `test` on the test's own listeners, then on the
/// suite's.
fn broadcast<'a, F>(suite: &EventEmitter, test: &'a TestCase, build: F)
where
    F: Fn(&'a TestCase) -> SuiteEvent<'a>,
{
    let event = build(test);
    test.emitter.emit(&event);
    suite.emit(&event);
}

fn insert_absent(headers: &mut IndexMap<String, String>, name: &str, value: &str) {
    if !headers.keys().any(|k| k.eq_ignore_ascii_case(name)) {
        headers.insert(name.to_string(), value.to_string());
    }
}

/// Appends `path` to `base` with exactly one slash between them.
fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with('?') {
        return format!("{base}{path}");
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
