//! Lifecycle events and the listener registry shared by suites and tests.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::TestFailure;
use crate::ports::TransportError;
use crate::report::Report;
use crate::suite::TestCase;

/// Event names listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The suite began.
    Begin,
    /// The suite was paused.
    Paused,
    /// A test is about to be prepared and sent.
    Start,
    /// A test completed, passed or not.
    Finish,
    /// A test passed.
    Pass,
    /// A test failed.
    Fail,
    /// The suite ran out of tests.
    End,
    /// The transport failed.
    Error,
}

/// A lifecycle event with its payload.
#[derive(Debug, Clone, Copy)]
pub enum SuiteEvent<'a> {
    /// The suite began.
    Begin,
    /// The suite was paused.
    Paused,
    /// A test is starting.
    Start(&'a TestCase),
    /// A test completed.
    Finish {
        /// The test.
        test: &'a TestCase,
        /// Its failure, if any.
        error: Option<&'a TestFailure>,
        /// Response status, if a response arrived.
        status: Option<u16>,
        /// Response body, if a response arrived.
        data: Option<&'a Value>,
    },
    /// A test passed.
    Pass {
        /// The test.
        test: &'a TestCase,
        /// Response status.
        status: u16,
        /// Response body.
        data: &'a Value,
    },
    /// A test failed.
    Fail {
        /// The test.
        test: &'a TestCase,
        /// The failure.
        error: &'a TestFailure,
        /// Response status, if a response arrived.
        status: Option<u16>,
        /// Response body, if a response arrived.
        data: Option<&'a Value>,
    },
    /// The suite completed.
    End(&'a Report),
    /// The transport failed.
    Error(&'a TransportError),
}

impl SuiteEvent<'_> {
    /// Returns the event's name.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Begin => EventKind::Begin,
            Self::Paused => EventKind::Paused,
            Self::Start(_) => EventKind::Start,
            Self::Finish { .. } => EventKind::Finish,
            Self::Pass { .. } => EventKind::Pass,
            Self::Fail { .. } => EventKind::Fail,
            Self::End(_) => EventKind::End,
            Self::Error(_) => EventKind::Error,
        }
    }
}

/// A registered listener.
pub type Listener = Arc<dyn Fn(&SuiteEvent<'_>) + Send + Sync>;

/// Ordered listener registry. Listeners for a specific kind and catch-all
/// listeners fire in registration order.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Vec<(Option<EventKind>, Listener)>,
}

impl EventEmitter {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one event kind.
    pub fn on<F>(&mut self, kind: EventKind, listener: F)
    where
        F: Fn(&SuiteEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners.push((Some(kind), Arc::new(listener)));
    }

    /// Registers a listener for every event.
    pub fn on_any<F>(&mut self, listener: F)
    where
        F: Fn(&SuiteEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners.push((None, Arc::new(listener)));
    }

    /// Delivers an event to every matching listener.
    pub fn emit(&self, event: &SuiteEvent<'_>) {
        let kind = event.kind();
        for (filter, listener) in &self.listeners {
            if filter.is_none_or(|k| k == kind) {
                listener(event);
            }
        }
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[test]
    fn test_emit_filters_by_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = EventEmitter::new();

        let log = Arc::clone(&seen);
        emitter.on(EventKind::Begin, move |_| log.lock().unwrap().push("begin"));
        let log = Arc::clone(&seen);
        emitter.on(EventKind::Paused, move |_| log.lock().unwrap().push("paused"));
        let log = Arc::clone(&seen);
        emitter.on_any(move |event| {
            if event.kind() == EventKind::Begin {
                log.lock().unwrap().push("any");
            }
        });

        emitter.emit(&SuiteEvent::Begin);
        assert_eq!(*seen.lock().unwrap(), vec!["begin", "any"]);
        assert_eq!(emitter.len(), 3);
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = EventEmitter::new();
        emitter.emit(&SuiteEvent::Paused);
        assert!(emitter.is_empty());
    }
}
