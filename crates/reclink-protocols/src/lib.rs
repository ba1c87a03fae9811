//! # reclink protocols
//!
//! Shared vocabulary for the two cooperating halves of reclink:
//!
//! - the **Coordinator**, which watches browser tabs and stores captured
//!   recording URLs, and
//! - the **Extractor**, which runs against the schedule page, clicks the
//!   recording buttons and assembles the report.
//!
//! This crate holds only data types, wire messages, the URL classification
//! rule and the host capability traits. Implementations live elsewhere.
//!
//! ## Core Traits
//!
//! - [`TabHost`] - privileged browser tab facility (list, close, events)
//! - [`Notifier`] - operator-facing notifications
//! - [`SchedulePage`] - the scheduling page as seen by the extractor
//! - [`CoordinatorLink`] - page-side end of the message channel

pub mod classify;
pub mod error;
pub mod host;
pub mod message;
pub mod types;

pub use classify::{find_recording_urls, RecordingClassifier};
pub use error::{ExtractError, HostError, MessagingError};
pub use host::{CoordinatorLink, Notifier, SchedulePage, TabEventStream, TabHost};
pub use message::{Envelope, PageMessage, Request, Response, NOTIFICATION_TITLE};
pub use types::*;
