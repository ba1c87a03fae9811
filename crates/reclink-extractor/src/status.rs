//! Live status surface for a pass.

use tracing::{error, info};

use crate::context::LogEntry;

/// Live counters shown while a pass runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounters {
    pub sessions: usize,
    pub available: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Where progress is shown to the operator.
pub trait StatusSurface: Send + Sync {
    fn log(&self, entry: &LogEntry);

    fn counters(&self, counters: StatusCounters);

    /// A pass-ending failure.
    fn error(&self, message: &str);
}

/// Status surface that writes through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatus;

impl StatusSurface for TracingStatus {
    fn log(&self, entry: &LogEntry) {
        info!(target: "reclink::status", "{}", entry.message);
    }

    fn counters(&self, c: StatusCounters) {
        info!(
            target: "reclink::status",
            sessions = c.sessions,
            available = c.available,
            resolved = c.resolved,
            unresolved = c.unresolved,
            "Sessions: {} found, {} with recordings, {} resolved, {} pending",
            c.sessions,
            c.available,
            c.resolved,
            c.unresolved
        );
    }

    fn error(&self, message: &str) {
        error!(target: "reclink::status", "{}", message);
    }
}
