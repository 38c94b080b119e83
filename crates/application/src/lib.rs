//! Wrestle Application - Suite engine and runner
//!
//! This crate defines the application layer with:
//! - The transport port (interface for the network collaborator)
//! - The suite context, its test builder and the sequential runner
//! - Lifecycle events, run reports and suite configuration

pub mod config;
pub mod error;
pub mod events;
pub mod ports;
pub mod report;
pub mod suite;

pub use config::{DisplayOptions, SuiteConfig};
pub use error::{SuiteError, SuiteResult, TestFailure};
pub use events::{EventEmitter, EventKind, Listener, SuiteEvent};
pub use ports::{Transport, TransportError, TransportRequest, TransportResponse};
pub use report::{Report, ReportSummary, TestRecord};
pub use suite::{
    Completion, Expectation, PauseHandle, RunState, Suite, TestBuilder, TestCallback, TestCase,
    TestOutcome,
};
