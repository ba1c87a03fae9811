//! # reclink extractor
//!
//! The page-side half of reclink. It parses the schedule table into
//! [`Session`](reclink_protocols::Session)s, decides which recording buttons
//! are usable, and resolves each one to a recording URL. It then supports
//! manual reconciliation and exports a JSON report.
//!
//! Resolution tries, in order:
//! 1. a URL embedded in the button's own markup;
//! 2. clicking the button and waiting for the coordinator to push a capture
//!    carrying this click's correlation token;
//! 3. scanning the page and the coordinator's capture list for new URLs;
//! 4. the unresolved sentinel, left for reconciliation.

mod context;
mod export;
mod extractor;
mod reconcile;
mod resolve;
mod source;
mod state;
mod status;

pub use context::{ExtractionContext, LogEntry, ProgressLog};
pub use export::{report_filename, ExtractionInfo, FileReportSink, Report, ReportSink};
pub use extractor::{Extractor, PassSummary, ReconcileOutcome, TriggerOutcome};
pub use reconcile::pair_unresolved;
pub use resolve::Resolution;
pub use source::{ButtonInfo, HtmlSessionSource, ParsedTable, RowRecord, SessionSource};
pub use state::PassState;
pub use status::{StatusCounters, StatusSurface, TracingStatus};
