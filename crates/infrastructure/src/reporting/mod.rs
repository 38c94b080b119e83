//! Presentation of suite runs.

mod console;
mod json;

pub use console::{ConsoleReporter, DEFAULT_MAX_ITEMS, pretty_response, render_report};
pub use json::{ReportWriteError, report_json, write_report};
