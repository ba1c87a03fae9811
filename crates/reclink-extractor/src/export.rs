//! JSON report assembly and the file sink.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reclink_protocols::{ExtractError, Session};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::ExtractionContext;

/// Pass metadata at the top of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionInfo {
    pub extracted_at: DateTime<Utc>,
    pub url: String,
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub current_week: Option<u32>,
}

/// The exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub extraction_info: ExtractionInfo,
    /// Sessions with a real recording URL; the sentinel never appears here.
    pub active_sessions: Vec<Session>,
    pub all_sessions: Vec<Session>,
    pub debug_log: Vec<String>,
}

impl Report {
    pub fn from_context(context: &ExtractionContext, extracted_at: DateTime<Utc>) -> Self {
        let active_sessions: Vec<Session> = context
            .sessions
            .iter()
            .filter(|s| s.resolved_url().is_some())
            .cloned()
            .collect();
        Self {
            extraction_info: ExtractionInfo {
                extracted_at,
                url: context.page_url.clone(),
                total_sessions: context.sessions.len(),
                active_sessions: active_sessions.len(),
                current_week: context.week,
            },
            active_sessions,
            all_sessions: context.sessions.clone(),
            debug_log: context.log.lines(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExtractError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `{prefix}-{timestamp}.json`, safe on every filesystem.
pub fn report_filename(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.json", prefix, at.format("%Y-%m-%dT%H-%M-%S"))
}

/// Accepts a serialized report.
pub trait ReportSink: Send + Sync {
    /// Store `contents` under `filename`; returns where it went.
    fn save(&self, filename: &str, contents: &str) -> Result<String, ExtractError>;
}

/// Writes reports into a directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for FileReportSink {
    fn save(&self, filename: &str, contents: &str) -> Result<String, ExtractError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ExtractError::Export(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, contents)
            .map_err(|e| ExtractError::Export(format!("{}: {}", path.display(), e)))?;
        info!("Report written to {}", path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
