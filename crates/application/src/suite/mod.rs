//! Engine context
//!
//! A [`Suite`] owns everything a run shares: the variable store (with the
//! cookie jar), the schema registry, the test queue and the listeners.
//! Independent suites are independent values.

mod builder;
mod runner;
mod test_case;

pub use builder::{Expectation, TestBuilder};
pub use runner::{PauseHandle, RunState};
pub use test_case::{Completion, TestCallback, TestCase, TestOutcome};

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use serde_json::{Map, Value};
use wrestle_domain::{
    DomainResult, HttpMethod, Namespace, Schema, SchemaRegistry, SchemaScope, TestSpec,
    URL_VARIABLE, VariableStore,
};

use crate::config::SuiteConfig;
use crate::events::{EventEmitter, EventKind, SuiteEvent};
use crate::ports::Transport;
use crate::report::Report;

/// A test suite bound to one transport.
pub struct Suite<T: Transport> {
    transport: T,
    config: SuiteConfig,
    store: VariableStore,
    schemas: SchemaRegistry,
    tests: Vec<TestCase>,
    events: EventEmitter,
    buffer: VecDeque<usize>,
    state: RunState,
    report: Option<Report>,
    pause_flag: Arc<AtomicBool>,
}

impl<T: Transport> Suite<T> {
    /// Creates a suite with default configuration.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SuiteConfig::default())
    }

    /// Creates a suite. A configured base URL seeds the `url` variable.
    #[must_use]
    pub fn with_config(transport: T, config: SuiteConfig) -> Self {
        let mut store = VariableStore::new();
        if let Some(base_url) = &config.base_url {
            store.define(URL_VARIABLE, base_url.as_str());
        }
        Self {
            transport,
            config,
            store,
            schemas: SchemaRegistry::new(),
            tests: Vec::new(),
            events: EventEmitter::new(),
            buffer: VecDeque::new(),
            state: RunState::Idle,
            report: None,
            pause_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The suite configuration.
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// The transport in use.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    // Variables

    /// Stores a variable, overwriting any previous value.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.store.define(name, value);
        self
    }

    /// Stores every entry of `values`.
    pub fn define_all(&mut self, values: Map<String, Value>) -> &mut Self {
        self.store.define_all(values);
        self
    }

    /// Sets the base URL (the `url` variable).
    pub fn base_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.store.define(URL_VARIABLE, url.into());
        self
    }

    /// Looks up a variable.
    #[must_use]
    pub fn retrieve(&self, name: &str) -> Option<&Value> {
        self.store.retrieve(name)
    }

    /// Replaces `:name` placeholders in `template`.
    ///
    /// # Errors
    ///
    /// Returns [`wrestle_domain::DomainError::UndefinedVariable`] for the
    /// first placeholder without a value.
    pub fn format(&self, template: &str) -> DomainResult<String> {
        self.store.format(template)
    }

    /// Formats every leaf of a nested value.
    ///
    /// # Errors
    ///
    /// Returns [`wrestle_domain::DomainError::UndefinedVariable`] for the
    /// first placeholder without a value.
    pub fn expand(&self, node: &Value) -> DomainResult<Value> {
        self.store.expand(node)
    }

    /// Merges a raw `Set-Cookie` value into the cookie jar.
    pub fn set_cookie(&mut self, raw: &str) -> &mut Self {
        self.store.set_cookie(raw);
        self
    }

    /// The variable store.
    #[must_use]
    pub const fn variables(&self) -> &VariableStore {
        &self.store
    }

    /// Mutable access to the variable store.
    pub const fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    // Schemas

    /// Registers a schema fragment, merging it into any fragment already
    /// stored under the same namespace and scope.
    pub fn schema(&mut self, namespace: Namespace, scope: SchemaScope, fragment: Schema) -> &mut Self {
        self.schemas.register(namespace, scope, fragment);
        self
    }

    /// Registers a `request` fragment (default parameters).
    pub fn request_schema(&mut self, scope: SchemaScope, fragment: Schema) -> &mut Self {
        self.schema(Namespace::Request, scope, fragment)
    }

    /// Registers a `response` fragment.
    pub fn response_schema(&mut self, scope: SchemaScope, fragment: Schema) -> &mut Self {
        self.schema(Namespace::Response, scope, fragment)
    }

    /// Registers a `headers` fragment (default request headers).
    pub fn headers_schema(&mut self, scope: SchemaScope, fragment: Schema) -> &mut Self {
        self.schema(Namespace::Headers, scope, fragment)
    }

    /// The schema registry.
    #[must_use]
    pub const fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Compiles the schema of `namespace` that applies to `spec`, using its
    /// method and expected status. Response compilation additionally merges
    /// the test's own fragment on top.
    #[must_use]
    pub fn compile_schema(&self, spec: &TestSpec, namespace: Namespace) -> Schema {
        compile_for(&self.schemas, spec, namespace, spec.expected_status)
    }

    // Tests

    /// Queues a test and returns its builder.
    pub fn test(&mut self, method: HttpMethod, path: impl Into<String>) -> TestBuilder<'_> {
        let index = self.tests.len();
        self.tests.push(TestCase::new(index, TestSpec::new(method, path)));
        TestBuilder::new(&mut self.tests[index])
    }

    /// Queues a `GET` test.
    pub fn get(&mut self, path: impl Into<String>) -> TestBuilder<'_> {
        self.test(HttpMethod::Get, path)
    }

    /// Queues a `POST` test.
    pub fn post(&mut self, path: impl Into<String>) -> TestBuilder<'_> {
        self.test(HttpMethod::Post, path)
    }

    /// Queues a `PUT` test.
    pub fn put(&mut self, path: impl Into<String>) -> TestBuilder<'_> {
        self.test(HttpMethod::Put, path)
    }

    /// Queues a `PATCH` test.
    pub fn patch(&mut self, path: impl Into<String>) -> TestBuilder<'_> {
        self.test(HttpMethod::Patch, path)
    }

    /// Queues a `DELETE` test.
    pub fn delete(&mut self, path: impl Into<String>) -> TestBuilder<'_> {
        self.test(HttpMethod::Delete, path)
    }

    /// Every queued test, in declaration order.
    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Mutable access to a queued test, e.g. to attach listeners.
    pub fn test_mut(&mut self, index: usize) -> Option<&mut TestCase> {
        self.tests.get_mut(index)
    }

    // Events

    /// Registers a suite-level listener for one event kind.
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: Fn(&SuiteEvent<'_>) + Send + Sync + 'static,
    {
        self.events.on(kind, listener);
        self
    }

    /// Registers a suite-level listener for every event.
    pub fn on_any<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&SuiteEvent<'_>) + Send + Sync + 'static,
    {
        self.events.on_any(listener);
        self
    }

    // Results

    /// The current run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// The report of the current or last run.
    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Number of selected tests not yet recorded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }
}

impl<T: Transport> std::fmt::Debug for Suite<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("config", &self.config)
            .field("tests", &self.tests.len())
            .field("state", &self.state)
            .field("remaining", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// Merges the registry tiers for `spec` and, for responses, the test's own
/// fragment.
fn compile_for(
    schemas: &SchemaRegistry,
    spec: &TestSpec,
    namespace: Namespace,
    status: Option<u16>,
) -> Schema {
    let mut schema = schemas.compile(namespace, spec.method, status);
    if namespace == Namespace::Response
        && let Some(fragment) = &spec.schema
    {
        schema.merge(fragment);
    }
    schema
}
