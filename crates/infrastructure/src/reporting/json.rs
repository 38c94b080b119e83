//! JSON report files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use wrestle_application::Report;

/// Errors that can occur while writing a JSON report.
#[derive(Debug, Error)]
pub enum ReportWriteError {
    /// The report summary could not be encoded.
    #[error("cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),

    /// The report file could not be written.
    #[error("cannot write report to {path}: {source}")]
    Write {
        /// Report path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Renders the summary of `report` as 2-space indented JSON ending in a
/// newline. Keys keep the summary's field order.
///
/// # Errors
///
/// Returns an error if a recorded response cannot be encoded.
pub fn report_json(report: &Report) -> Result<String, ReportWriteError> {
    encode(&report.summary())
}

/// Writes the summary of `report` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub async fn write_report(path: impl AsRef<Path>, report: &Report) -> Result<(), ReportWriteError> {
    let path = path.as_ref();
    let json = report_json(report)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| ReportWriteError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), tests = report.total(), "report written");
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> Result<String, ReportWriteError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
