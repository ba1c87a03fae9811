//! Per-pass aggregate: sessions, week, and the progress log.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use chrono::{DateTime, Local, Utc};
use reclink_protocols::{CorrelationToken, RecordingLink, Session};
use serde::Serialize;

/// One human-readable progress line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.at.with_timezone(&Local).format("%H:%M:%S"),
            self.message
        )
    }
}

/// Bounded append-only log; the oldest entries fall off at capacity.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl ProgressLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) -> &LogEntry {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Utc::now(),
            message: message.into(),
        });
        // Just pushed, so never empty.
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

/// State of one extraction pass. A new pass replaces it entirely.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub page_url: String,
    pub started_at: DateTime<Utc>,
    pub week: Option<u32>,
    pub sessions: Vec<Session>,
    pub log: ProgressLog,
    tokens: HashMap<usize, CorrelationToken>,
    assigned: HashSet<String>,
}

impl ExtractionContext {
    pub fn new(page_url: impl Into<String>, log_capacity: usize) -> Self {
        Self {
            page_url: page_url.into(),
            started_at: Utc::now(),
            week: None,
            sessions: Vec::new(),
            log: ProgressLog::new(log_capacity),
            tokens: HashMap::new(),
            assigned: HashSet::new(),
        }
    }

    /// Correlation token issued for the session at `index`, if it was clicked.
    pub fn token(&self, index: usize) -> Option<CorrelationToken> {
        self.tokens.get(&index).copied()
    }

    pub(crate) fn remember_token(&mut self, index: usize, token: CorrelationToken) {
        self.tokens.insert(index, token);
    }

    pub(crate) fn tokens(&self) -> &HashMap<usize, CorrelationToken> {
        &self.tokens
    }

    /// Whether `url` already belongs to a session of this pass.
    pub fn is_assigned(&self, url: &str) -> bool {
        self.assigned.contains(url)
    }

    pub(crate) fn assigned(&self) -> &HashSet<String> {
        &self.assigned
    }

    /// Store a resolved URL on a session and mark it taken.
    pub(crate) fn resolve(&mut self, index: usize, url: String) {
        if let Some(session) = self.sessions.get_mut(index) {
            self.assigned.insert(url.clone());
            session.has_link = true;
            session.link_url = Some(RecordingLink::Resolved(url));
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.resolved_url().is_some()).count()
    }

    /// Indices of sessions carrying the unresolved sentinel.
    pub fn unresolved(&self) -> Vec<usize> {
        self.sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_unresolved())
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_log_drops_oldest() {
        let mut log = ProgressLog::new(2);
        log.push("one");
        log.push("two");
        log.push("three");
        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_progress_log_zero_capacity_keeps_one() {
        let mut log = ProgressLog::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_log_line_format() {
        let mut log = ProgressLog::new(10);
        log.push("Found 3 sessions");
        let line = &log.lines()[0];
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Found 3 sessions"));
    }

    #[test]
    fn test_resolve_marks_assigned() {
        let mut ctx = ExtractionContext::new("https://conference.utec.edu.pe/", 10);
        ctx.sessions.push(Session {
            course: "A".to_string(),
            section: String::new(),
            date: String::new(),
            start_time: String::new(),
            instructor: String::new(),
            session_type: String::new(),
            status: String::new(),
            modality: String::new(),
            week: None,
            has_link: true,
            link_url: Some(RecordingLink::Unresolved),
            button_id: Some("ver1".to_string()),
            button_enabled: true,
            extracted_at: Utc::now(),
        });
        assert_eq!(ctx.unresolved(), vec![0]);

        ctx.resolve(0, "https://zoom.us/rec/share/x".to_string());
        assert!(ctx.is_assigned("https://zoom.us/rec/share/x"));
        assert_eq!(ctx.resolved_count(), 1);
        assert!(ctx.unresolved().is_empty());
    }
}
