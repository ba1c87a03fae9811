//! Session table sources.
//!
//! A [`SessionSource`] turns a page snapshot into ordered row records. The
//! resolution logic only sees these records, so it can be driven by
//! synthetic tables in tests.

use reclink_protocols::{ExtractError, SessionMetadata};

mod html;

pub use html::HtmlSessionSource;

/// A recording-reveal button found in a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonInfo {
    pub id: String,
    /// Not disabled by attribute or class.
    pub enabled: bool,
    /// Carries the "recording available" icon.
    pub marked: bool,
    /// Markup that may embed a URL: click handler, data attributes,
    /// enclosing link.
    pub hints: Vec<String>,
}

impl ButtonInfo {
    pub fn available(&self) -> bool {
        self.enabled && self.marked
    }
}

/// One parsed table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// Position of the row in the table body.
    pub row: usize,
    pub metadata: SessionMetadata,
    pub button: Option<ButtonInfo>,
}

/// Everything a pass needs from one page snapshot.
#[derive(Debug, Default)]
pub struct ParsedTable {
    pub week: Option<u32>,
    /// Rows in table order. A row-local failure does not stop the others.
    pub rows: Vec<Result<RowRecord, ExtractError>>,
}

/// Extracts schedule rows and URL candidates from a page document.
pub trait SessionSource: Send + Sync {
    /// Parse the session table. Fails only when no table is present.
    fn parse(&self, document: &str) -> Result<ParsedTable, ExtractError>;

    /// Every URL visible in links, frames and text of the document.
    fn candidate_urls(&self, document: &str) -> Vec<String>;
}
