//! Pass state machine and re-entrancy guard.

use std::fmt;

use parking_lot::Mutex;

/// Phase of the current extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Parsing,
    Resolving,
    Finalizing,
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Resolving => "resolving",
            Self::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

/// Holds the pass slot; the state returns to `Idle` when dropped, whether
/// the pass finished or bailed out with an error.
pub(crate) struct PassGuard<'a> {
    state: &'a Mutex<PassState>,
}

impl<'a> PassGuard<'a> {
    /// Claim the slot, or `None` if a pass is already running.
    pub(crate) fn try_begin(state: &'a Mutex<PassState>) -> Option<Self> {
        let mut current = state.lock();
        if *current != PassState::Idle {
            return None;
        }
        *current = PassState::Parsing;
        Some(Self { state })
    }

    pub(crate) fn advance(&self, next: PassState) {
        *self.state.lock() = next;
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = PassState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected() {
        let state = Mutex::new(PassState::Idle);
        let guard = PassGuard::try_begin(&state).unwrap();
        assert_eq!(*state.lock(), PassState::Parsing);
        assert!(PassGuard::try_begin(&state).is_none());

        guard.advance(PassState::Resolving);
        assert_eq!(*state.lock(), PassState::Resolving);
        drop(guard);

        assert_eq!(*state.lock(), PassState::Idle);
        assert!(PassGuard::try_begin(&state).is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(PassState::Finalizing.to_string(), "finalizing");
    }
}
