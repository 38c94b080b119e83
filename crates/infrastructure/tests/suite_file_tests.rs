//! Integration tests for suite files, the console presenter and report
//! output.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::tempdir;
use wrestle_application::{
    DisplayOptions, RunState, Transport, TransportError, TransportRequest, TransportResponse,
};
use wrestle_domain::Selection;
use wrestle_infrastructure::{
    ConsoleReporter, ReportWriteError, SuiteFileError, load_suite, report_json, write_report,
};

/// Answers `/login` with a session and echoes the URL for everything else.
#[derive(Default)]
struct EchoTransport {
    sent: Mutex<Vec<TransportRequest>>,
}

#[async_trait]
impl Transport for EchoTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if request.url.ends_with("/login") {
            return Ok(TransportResponse::new(
                200,
                json!({"ok": true, "session": {"id": "s-42"}}),
            )
            .with_header("Set-Cookie", "sid=s-42; Path=/"));
        }
        Ok(TransportResponse::new(
            200,
            json!({"ok": true, "url": request.url, "items": [1, 2, 3, 4, 5, 6, 7]}),
        ))
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

const SUITE: &str = r#"
config:
  base_url: http://localhost:8181
  display: { response_data: true }
variables:
  user: tom
schemas:
  - namespace: response
    schema: { ok: Boolean }
  - namespace: headers
    method: get
    schema: { X-User: ":user" }
tests:
  - method: post
    path: /login
    description: log in
    params: { user: ":user" }
    expect:
      status: 200
      schema: { session: { id: "/^s-\\d+$/" } }
      capture: { session: session.id }
  - method: get
    path: /session/:session
    expect:
      schema: { items: [Number] }
  - method: get
    path: /missing
    expect:
      status: 404
"#;

#[tokio::test]
async fn test_yaml_suite_runs_with_capture() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("suite.yaml");
    std::fs::write(&path, SUITE).unwrap();

    let file = load_suite(&path).await.expect("Failed to load suite");
    let mut suite = file.into_suite(EchoTransport::default()).unwrap();

    let output = SharedBuffer::default();
    ConsoleReporter::new(suite.config().display).attach_writer(&mut suite, output.clone());

    let state = suite.begin(Selection::All).await.unwrap();
    assert_eq!(state, RunState::Completed);

    let sent = suite.transport().sent.lock().unwrap().clone();
    assert_eq!(sent[0].data["user"], json!("tom"));
    assert_eq!(sent[1].url, "http://localhost:8181/session/s-42");
    assert_eq!(sent[1].header("cookie"), Some("sid=s-42"));
    assert_eq!(sent[1].header("x-user"), Some("tom"));
    assert_eq!(sent[0].header("x-user"), None);

    let report = suite.report().unwrap();
    assert_eq!(report.total(), 3);
    assert_eq!(report.passed_count(), 2);
    assert_eq!(report.failed_count(), 1);

    let text = output.text();
    assert!(text.contains("Beginning tests."));
    assert!(text.contains("Test #1: POST /login (log in)"));
    assert!(text.contains("Test #3: GET /missing"));
    assert!(text.contains("Test failed. expected status 404, got 200"));
    assert!(text.contains("… 2 more"));
    assert!(text.contains("..F"));
    assert!(text.contains("Testing complete. 2 passed. 1 failed. 3 in total."));

    let report_path = dir.path().join("report.json");
    write_report(&report_path, report).await.unwrap();
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["total"], json!(3));
    assert_eq!(written["tests"]["failed"][0]["path"], json!("/missing"));
    assert_eq!(written["tests"]["all"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_json_suite_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("suite.json");
    std::fs::write(
        &path,
        r#"{"config": {"base_url": "http://api.test"}, "tests": [{"method": "get", "path": "/health"}]}"#,
    )
    .unwrap();

    let file = load_suite(&path).await.unwrap();
    let mut suite = file.into_suite(EchoTransport::default()).unwrap();
    ConsoleReporter::new(DisplayOptions::quiet()).attach_writer(&mut suite, SharedBuffer::default());
    suite.begin(Selection::All).await.unwrap();

    assert_eq!(suite.report().unwrap().passed_count(), 1);
}

#[tokio::test]
async fn test_unknown_method_is_rejected() {
    let file = wrestle_infrastructure::parse_suite(
        "tests:\n  - { method: fetch, path: /x }\n",
        wrestle_infrastructure::SuiteFormat::Yaml,
    )
    .unwrap();

    let result = file.into_suite(EchoTransport::default());

    match result {
        Err(SuiteFileError::Domain { context, .. }) => assert!(context.starts_with("test #1")),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let result = load_suite(dir.path().join("nope.yaml")).await;
    assert!(matches!(result, Err(SuiteFileError::Io { .. })));
}

#[tokio::test]
async fn test_report_write_failure_names_path() {
    let dir = tempdir().expect("Failed to create temp directory");
    let file = wrestle_infrastructure::parse_suite(
        "config: { base_url: http://api.test }\ntests:\n  - { method: get, path: /health }\n",
        wrestle_infrastructure::SuiteFormat::Yaml,
    )
    .unwrap();
    let mut suite = file.into_suite(EchoTransport::default()).unwrap();
    suite.begin(Selection::All).await.unwrap();
    let report = suite.report().unwrap();

    let json = report_json(report).unwrap();
    assert!(json.ends_with("}\n"));
    assert!(json.contains("\n  \"passed\": 1"));

    let target = dir.path().join("missing").join("report.json");
    match write_report(&target, report).await {
        Err(ReportWriteError::Write { path, .. }) => assert_eq!(path, target),
        other => panic!("unexpected result: {other:?}"),
    }
}
