//! Manual reconciliation of unresolved sessions against late captures.

use std::collections::{HashMap, HashSet};

use reclink_protocols::{CapturedRecording, CorrelationToken, Session};

/// Pair unresolved sessions with captures no session has claimed yet.
///
/// A capture carrying a session's own correlation token or button id goes to
/// that session. Whatever remains is handed out first-available, in table
/// order. Returns `(session index, url)` pairs sorted by index.
pub fn pair_unresolved(
    sessions: &[Session],
    tokens: &HashMap<usize, CorrelationToken>,
    captures: &[CapturedRecording],
    assigned: &HashSet<String>,
) -> Vec<(usize, String)> {
    let mut seen = HashSet::new();
    let mut free: Vec<&CapturedRecording> = captures
        .iter()
        .filter(|c| !assigned.contains(&c.url))
        .filter(|c| seen.insert(c.url.as_str()))
        .collect();

    let mut pairs = Vec::new();
    let mut leftover = Vec::new();
    for (index, session) in sessions.iter().enumerate() {
        if !session.is_unresolved() {
            continue;
        }
        let token = tokens.get(&index).copied();
        let owned = free.iter().position(|c| {
            let by_token = token.is_some() && c.token == token;
            let by_button = session.button_id.is_some() && c.button_id() == session.button_id.as_deref();
            by_token || by_button
        });
        match owned {
            Some(pos) => pairs.push((index, free.remove(pos).url.clone())),
            None => leftover.push(index),
        }
    }

    for (index, capture) in leftover.into_iter().zip(free) {
        pairs.push((index, capture.url.clone()));
    }
    pairs.sort_by_key(|(index, _)| *index);
    pairs
}
