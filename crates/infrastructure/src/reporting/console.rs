//! Console presenter
//!
//! Prints the suite lifecycle as plain text, one switch per kind of
//! output.

use std::io::{self, Write};
use std::sync::Mutex;

use serde_json::Value;
use wrestle_application::{DisplayOptions, Report, Suite, SuiteEvent, TestCase, Transport};

/// Arrays longer than this are collapsed when a response is printed.
pub const DEFAULT_MAX_ITEMS: usize = 5;

/// Renders lifecycle events according to [`DisplayOptions`].
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    options: DisplayOptions,
    max_items: usize,
}

impl ConsoleReporter {
    /// Creates a reporter.
    #[must_use]
    pub const fn new(options: DisplayOptions) -> Self {
        Self {
            options,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Sets how many array items a printed response keeps.
    #[must_use]
    pub const fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Prints every event of `suite` to standard output.
    pub fn attach<T: Transport>(self, suite: &mut Suite<T>) {
        self.attach_writer(suite, io::stdout());
    }

    /// Writes every event of `suite` to `writer`.
    pub fn attach_writer<T, W>(self, suite: &mut Suite<T>, writer: W)
    where
        T: Transport,
        W: Write + Send + 'static,
    {
        let out = Mutex::new(writer);
        suite.on_any(move |event| {
            let Some(text) = self.render(event) else {
                return;
            };
            if let Ok(mut out) = out.lock() {
                // A closed stdout must not abort the run.
                let _ = writeln!(out, "{text}");
            }
        });
    }

    /// Renders one event, or `None` when its display switch is off.
    #[must_use]
    pub fn render(&self, event: &SuiteEvent<'_>) -> Option<String> {
        let options = &self.options;
        match event {
            SuiteEvent::Begin => options.begin.then(|| "Beginning tests.\n".to_string()),
            SuiteEvent::Paused => options.begin.then(|| "Tests paused.".to_string()),
            SuiteEvent::Start(test) => self.render_start(test),
            SuiteEvent::Finish { status, data, .. } => options.response.then(|| {
                let status = status.map_or_else(|| "-".to_string(), |s| s.to_string());
                match data {
                    Some(data) if options.response_data => {
                        format!("Response: {status} {}", pretty_response(data, self.max_items))
                    }
                    _ => format!("Response: {status}"),
                }
            }),
            SuiteEvent::Pass { .. } => options.pass.then(|| "Test passed.\n".to_string()),
            SuiteEvent::Fail { error, .. } => {
                options.fail.then(|| format!("Test failed. {error}\n"))
            }
            SuiteEvent::Error(error) => options.fail.then(|| format!("Error: {error}")),
            SuiteEvent::End(report) => options.report.then(|| render_report(report)),
        }
    }

    fn render_start(&self, test: &TestCase) -> Option<String> {
        let spec = test.spec();
        let mut lines = Vec::new();

        if self.options.info {
            let mut line = format!("Test #{}: {} {}", test.index() + 1, spec.method, spec.path);
            if let Some(description) = &spec.description {
                line.push_str(&format!(" ({description})"));
            }
            if !spec.params.is_empty() {
                line.push(' ');
                line.push_str(&Value::Object(spec.params.clone()).to_string());
            }
            lines.push(line);
        }

        if self.options.expect {
            let status = spec
                .expected_status
                .map_or_else(|| "any status".to_string(), |s| s.to_string());
            match &spec.schema {
                Some(schema) => lines.push(format!(
                    "Expect:  {status} {}",
                    Value::Object(schema.to_map())
                )),
                None => lines.push(format!("Expect:  {status}")),
            }
        }

        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

/// One mark per test (`.` passed, `F` failed) and the totals.
#[must_use]
pub fn render_report(report: &Report) -> String {
    let marks: String = report
        .all()
        .iter()
        .map(|t| if t.pass { '.' } else { 'F' })
        .collect();
    format!(
        "{marks}\nTesting complete. {} passed. {} failed. {} in total. ({} ms)",
        report.passed_count(),
        report.failed_count(),
        report.total(),
        report.duration_ms()
    )
}

/// Copies a response body for display, keeping only the first `max_items`
/// items of every array followed by a `"… N more"` marker.
#[must_use]
pub fn pretty_response(value: &Value, max_items: usize) -> Value {
    match value {
        Value::Array(items) => {
            let mut shown: Vec<Value> = items
                .iter()
                .take(max_items)
                .map(|item| pretty_response(item, max_items))
                .collect();
            if items.len() > max_items {
                shown.push(Value::String(format!("… {} more", items.len() - max_items)));
            }
            Value::Array(shown)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), pretty_response(v, max_items)))
                .collect(),
        ),
        other => other.clone(),
    }
}
