//! Wrestle Infrastructure - Adapters and implementations
//!
//! This crate provides the reqwest transport behind the application's
//! transport port, the console presenter, the declarative suite-file
//! loader and JSON report files.

pub mod adapters;
pub mod reporting;
pub mod suite_file;

pub use adapters::ReqwestTransport;
pub use reporting::{ConsoleReporter, ReportWriteError, pretty_response, report_json, write_report};
pub use suite_file::{SuiteFile, SuiteFileError, SuiteFormat, load_suite, parse_suite};
