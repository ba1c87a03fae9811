//! # reclink coordinator
//!
//! The privileged half of reclink. It owns the capture list, the tracked
//! extraction tab and the pending click expectations. It watches tab
//! lifecycle events, classifies URLs, and relays captures to the page side.
//!
//! [`Coordinator`] is plain state plus the classification-and-capture
//! routine. It returns [`Effect`]s instead of performing I/O.
//! [`CoordinatorService`] owns one `Coordinator` inside a single task. Page
//! requests, operator commands and host tab events are processed one at a
//! time there, so the state needs no locking.

mod commands;
mod correlation;
mod service;
mod state;

pub use commands::{readiness_of, CommandOutcome, Readiness, EXTRACT_LINKS};
pub use correlation::ExpectationQueue;
pub use service::{CloseReport, CoordinatorHandle, CoordinatorService, PageLink};
pub use state::{Coordinator, CoordinatorSettings, Effect};
