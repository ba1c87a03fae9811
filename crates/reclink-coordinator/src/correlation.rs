//! Click expectations keyed by correlation token.
//!
//! Every click issues its own token, so a second click no longer overwrites
//! the first one's metadata. Tabs claim expectations in issue order. Entries
//! older than the TTL are dropped instead of being matched to an unrelated tab.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use reclink_protocols::{CorrelationToken, SessionMetadata};
use tracing::debug;

/// An issued, not yet claimed click expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub token: CorrelationToken,
    pub metadata: SessionMetadata,
    pub issued_at: DateTime<Utc>,
}

/// FIFO of outstanding expectations.
#[derive(Debug)]
pub struct ExpectationQueue {
    ttl: Duration,
    pending: VecDeque<Expectation>,
}

impl ExpectationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: VecDeque::new(),
        }
    }

    /// Register a click about to happen.
    pub fn issue(&mut self, metadata: SessionMetadata, now: DateTime<Utc>) -> CorrelationToken {
        let token = CorrelationToken::new();
        self.pending.push_back(Expectation {
            token,
            metadata,
            issued_at: now,
        });
        token
    }

    /// Take the oldest live expectation.
    pub fn claim(&mut self, now: DateTime<Utc>) -> Option<Expectation> {
        self.prune(now);
        self.pending.pop_front()
    }

    /// Remove the expectation for `token` if no tab has claimed it yet.
    pub fn withdraw(&mut self, token: CorrelationToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.token != token);
        before != self.pending.len()
    }

    /// Whether any expectation is still eligible.
    pub fn has_live(&self, now: DateTime<Utc>) -> bool {
        self.pending.iter().any(|e| now - e.issued_at <= self.ttl)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let before = self.pending.len();
        self.pending.retain(|e| now - e.issued_at <= ttl);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            debug!("Dropped {} expired expectation(s)", dropped);
        }
    }
}
