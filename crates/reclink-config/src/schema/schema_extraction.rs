//! Schedule table layout and extraction pacing.

use serde::{Deserialize, Serialize};

/// Page-side extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// How long to wait for a capture after clicking a button.
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,

    /// Pause between consecutive button clicks.
    #[serde(default = "default_click_delay_ms")]
    pub click_delay_ms: u64,

    /// Recording buttons have ids starting with this.
    #[serde(default = "default_button_id_prefix")]
    pub button_id_prefix: String,

    /// CSS selector of the icon marking an available recording.
    #[serde(default = "default_available_icon_selector")]
    pub available_icon_selector: String,

    /// CSS selector of the session table.
    #[serde(default = "default_table_selector")]
    pub table_selector: String,

    /// Label text next to the week number input.
    #[serde(default = "default_week_marker")]
    pub week_marker: String,

    /// Rows with fewer cells are not sessions.
    #[serde(default = "default_min_cells")]
    pub min_cells: usize,

    /// Maximum number of progress log entries kept per pass.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    #[serde(default)]
    pub columns: ColumnMap,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            capture_timeout_ms: default_capture_timeout_ms(),
            click_delay_ms: default_click_delay_ms(),
            button_id_prefix: default_button_id_prefix(),
            available_icon_selector: default_available_icon_selector(),
            table_selector: default_table_selector(),
            week_marker: default_week_marker(),
            min_cells: default_min_cells(),
            log_capacity: default_log_capacity(),
            columns: ColumnMap::default(),
        }
    }
}

fn default_capture_timeout_ms() -> u64 {
    5000
}

fn default_click_delay_ms() -> u64 {
    500
}

fn default_button_id_prefix() -> String {
    "ver".to_string()
}

fn default_available_icon_selector() -> String {
    ".icon-user-desk-1.text-green".to_string()
}

fn default_table_selector() -> String {
    "table".to_string()
}

fn default_week_marker() -> String {
    "Semana".to_string()
}

fn default_min_cells() -> usize {
    5
}

fn default_log_capacity() -> usize {
    500
}

/// Cell position of each session field.
///
/// Non-negative values index from the start of the row; negative values count
/// back from the end (`-1` is the last cell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub course: i32,
    pub section: i32,
    pub date: i32,
    pub start_time: i32,
    pub instructor: i32,
    #[serde(rename = "type")]
    pub session_type: i32,
    pub status: i32,
    pub modality: i32,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            course: 0,
            section: 1,
            date: 2,
            start_time: 3,
            instructor: 4,
            session_type: 5,
            status: 6,
            modality: -1,
        }
    }
}

impl ColumnMap {
    /// Resolve a configured position against a row of `len` cells.
    pub fn resolve(index: i32, len: usize) -> Option<usize> {
        if index >= 0 {
            let idx = index as usize;
            (idx < len).then_some(idx)
        } else {
            len.checked_sub(index.unsigned_abs() as usize)
        }
    }

    /// All positions with their field names, for validation.
    pub fn entries(&self) -> [(&'static str, i32); 8] {
        [
            ("course", self.course),
            ("section", self.section),
            ("date", self.date),
            ("start_time", self.start_time),
            ("instructor", self.instructor),
            ("type", self.session_type),
            ("status", self.status),
            ("modality", self.modality),
        ]
    }
}
