//! Structured session events.
//!
//! The session layer never surfaces storage errors to its callers, so the
//! only way to observe what happened is this event log: every lifecycle
//! transition and every absorbed failure is appended here in addition to the
//! `tracing` output. Tests assert on events instead of parsing log text.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Bounded event history size.
const EVENT_CAPACITY: usize = 64;

/// One observable session transition or absorbed failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Startup restore found a live persisted session.
    Restored { expires_at: i64 },
    /// Startup restore found an expired session and deleted it.
    Expired,
    /// Startup restore adopted a legacy (pre-expiry) record and rewrote it.
    Migrated { expires_at: i64 },
    /// A user logged in; the record was (re)written with this expiry.
    LoggedIn { expires_at: i64 },
    /// A live persisted session had its expiry extended.
    Refreshed { expires_at: i64 },
    /// The session was cleared in memory and storage.
    LoggedOut,
    /// The persisted value was not a usable session record.
    Malformed,
    /// A storage call failed and was absorbed.
    StorageFailure {
        operation: &'static str,
        message: String,
    },
}

/// Fixed-capacity ring of recent [`SessionEvent`]s.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<VecDeque<SessionEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, dropping the oldest once at capacity.
    pub fn record(&self, event: SessionEvent) {
        let mut events = self.events.lock();
        if events.len() == EVENT_CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn recent(&self) -> Vec<SessionEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Whether any absorbed storage failure has been recorded.
    pub fn has_failure(&self) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| matches!(e, SessionEvent::StorageFailure { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let log = EventLog::new();
        log.record(SessionEvent::LoggedIn { expires_at: 1 });
        log.record(SessionEvent::LoggedOut);
        assert_eq!(
            log.recent(),
            vec![SessionEvent::LoggedIn { expires_at: 1 }, SessionEvent::LoggedOut]
        );
    }

    #[test]
    fn drops_oldest_at_capacity() {
        let log = EventLog::new();
        for i in 0..(EVENT_CAPACITY as i64 + 10) {
            log.record(SessionEvent::LoggedIn { expires_at: i });
        }
        let events = log.recent();
        assert_eq!(events.len(), EVENT_CAPACITY);
        assert_eq!(events[0], SessionEvent::LoggedIn { expires_at: 10 });
    }

    #[test]
    fn has_failure_detects_storage_failures() {
        let log = EventLog::new();
        log.record(SessionEvent::LoggedOut);
        assert!(!log.has_failure());
        log.record(SessionEvent::StorageFailure {
            operation: "save",
            message: "disk full".into(),
        });
        assert!(log.has_failure());
    }
}
