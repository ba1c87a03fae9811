//! The page-side extractor: pass orchestration, reconciliation and export.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use reclink_config::{Config, ExtractionConfig, SiteConfig};
use reclink_protocols::{
    CoordinatorLink, ExtractError, PageMessage, RecordingClassifier, RecordingLink, Request,
    Response, SchedulePage, Session, SessionMetadata, NOTIFICATION_TITLE,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use url::Url;

use crate::context::ExtractionContext;
use crate::export::{report_filename, Report, ReportSink};
use crate::reconcile::pair_unresolved;
use crate::resolve::{Resolution, Resolver};
use crate::source::{ButtonInfo, HtmlSessionSource, SessionSource};
use crate::state::{PassGuard, PassState};
use crate::status::{StatusCounters, StatusSurface};

/// What happened to an extraction trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Completed(PassSummary),
    /// A pass was already running; the trigger was ignored.
    AlreadyRunning,
}

/// Totals of a finished pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub sessions: usize,
    pub available: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub week: Option<u32>,
}

/// Result of a reconciliation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// `(session index, url)` pairs adopted in this step.
    pub matched: Vec<(usize, String)>,
    /// Indices still carrying the unresolved sentinel.
    pub still_unresolved: Vec<usize>,
}

pub struct Extractor {
    config: ExtractionConfig,
    site: SiteConfig,
    file_prefix: String,
    classifier: RecordingClassifier,
    page: Arc<dyn SchedulePage>,
    link: Arc<dyn CoordinatorLink>,
    source: Arc<dyn SessionSource>,
    status: Arc<dyn StatusSurface>,
    state: Mutex<PassState>,
    last: Mutex<Option<ExtractionContext>>,
}

impl Extractor {
    pub fn new(
        config: &Config,
        page: Arc<dyn SchedulePage>,
        link: Arc<dyn CoordinatorLink>,
        source: Arc<dyn SessionSource>,
        status: Arc<dyn StatusSurface>,
    ) -> Self {
        Self {
            config: config.extraction.clone(),
            site: config.site.clone(),
            file_prefix: config.export.file_prefix.clone(),
            classifier: RecordingClassifier::new(
                config.provider.domain.clone(),
                config.provider.institution_host.clone(),
                config.provider.recording_path_markers.clone(),
            ),
            page,
            link,
            source,
            status,
            state: Mutex::new(PassState::Idle),
            last: Mutex::new(None),
        }
    }

    /// Extractor reading the live page through [`HtmlSessionSource`].
    pub fn with_html_source(
        config: &Config,
        page: Arc<dyn SchedulePage>,
        link: Arc<dyn CoordinatorLink>,
        status: Arc<dyn StatusSurface>,
    ) -> Result<Self, ExtractError> {
        let source = Arc::new(HtmlSessionSource::new(&config.extraction)?);
        Ok(Self::new(config, page, link, source, status))
    }

    pub fn state(&self) -> PassState {
        *self.state.lock()
    }

    /// Snapshot of the most recent pass.
    pub fn context(&self) -> Option<ExtractionContext> {
        self.last.lock().clone()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.last
            .lock()
            .as_ref()
            .map(|ctx| ctx.sessions.clone())
            .unwrap_or_default()
    }

    /// React to coordinator pushes until the channel closes.
    ///
    /// Each `extract-links` starts a pass on its own task, so a trigger that
    /// arrives mid-pass meets the re-entrancy guard instead of queueing.
    pub async fn serve(self: Arc<Self>) {
        let mut pushes = self.link.subscribe();
        loop {
            match pushes.recv().await {
                Ok(envelope) if &envelope.to == self.link.tab_id() => match envelope.message {
                    PageMessage::ExtractLinks => {
                        let this = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = this.handle_extract_command().await {
                                warn!("Extraction failed: {}", e);
                            }
                        });
                    }
                    PageMessage::RecordingCaptured { recording } => {
                        debug!("Recording captured: {}", recording.url);
                    }
                },
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!("Missed {} pushes", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Run one extraction pass unless one is already in progress.
    pub async fn handle_extract_command(&self) -> Result<TriggerOutcome, ExtractError> {
        let Some(guard) = PassGuard::try_begin(&self.state) else {
            info!("Extraction already in progress; trigger ignored");
            return Ok(TriggerOutcome::AlreadyRunning);
        };

        let mut ctx = ExtractionContext::new("", self.config.log_capacity);
        let result = self.run_pass(&guard, &mut ctx).await;
        if let Err(e) = &result {
            let message = match e {
                ExtractError::Messaging(_) => format!("{}. Please refresh the page and try again", e),
                _ => format!("Error: {}", e),
            };
            self.status.error(&message);
            ctx.log.push(message);
        }
        *self.last.lock() = Some(ctx);
        result.map(TriggerOutcome::Completed)
    }

    async fn run_pass(
        &self,
        guard: &PassGuard<'_>,
        ctx: &mut ExtractionContext,
    ) -> Result<PassSummary, ExtractError> {
        let url = self
            .page
            .current_url()
            .await
            .map_err(|e| ExtractError::Page(e.to_string()))?;
        ctx.page_url = url.clone();
        if !self.on_site(&url) {
            return Err(ExtractError::WrongDomain(url));
        }

        self.link.send(Request::SetExtractionTab).await?;
        self.link.send(Request::ClearCapturedRecordings).await?;
        self.note(ctx, "Starting extraction");

        let html = self
            .page
            .document_html()
            .await
            .map_err(|e| ExtractError::Page(e.to_string()))?;
        let table = self.source.parse(&html)?;
        ctx.week = table.week;

        let mut keys = HashSet::new();
        let mut buttons: Vec<Option<ButtonInfo>> = Vec::new();
        for row in table.rows {
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    warn!("{}", e);
                    self.note(ctx, format!("Skipped row: {}", e));
                    continue;
                }
            };
            let session = new_session(record.metadata, record.button.as_ref(), ctx.week);
            let key = session.key();
            if !keys.insert(key.clone()) {
                self.note(ctx, format!("Duplicate session dropped: {}", key));
                continue;
            }
            buttons.push(record.button);
            ctx.sessions.push(session);
        }

        let available = buttons
            .iter()
            .filter(|b| b.as_ref().is_some_and(ButtonInfo::available))
            .count();
        let week = ctx
            .week
            .map(|w| w.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let found = format!(
            "Found {} sessions, {} with available recordings, for week {}",
            ctx.sessions.len(),
            available,
            week
        );
        self.note(ctx, found);
        self.publish_counters(ctx, available);

        guard.advance(PassState::Resolving);
        let resolver = Resolver {
            page: self.page.as_ref(),
            link: self.link.as_ref(),
            source: self.source.as_ref(),
            classifier: &self.classifier,
            capture_timeout: Duration::from_millis(self.config.capture_timeout_ms),
        };
        let delay = Duration::from_millis(self.config.click_delay_ms);
        let mut attempted = 0;
        for (index, button) in buttons.iter().enumerate() {
            let Some(button) = button.as_ref().filter(|b| b.available()) else {
                continue;
            };
            if attempted > 0 {
                tokio::time::sleep(delay).await;
            }
            attempted += 1;

            let metadata = ctx.sessions[index].metadata();
            self.note(
                ctx,
                format!("Resolving {}/{}: {}", attempted, available, metadata.course),
            );
            let attempt = resolver.resolve(metadata, button, ctx.assigned()).await;
            if let Some(token) = attempt.token {
                ctx.remember_token(index, token);
            }

            let label = attempt.resolution.label();
            let course = ctx.sessions[index].course.clone();
            match attempt.resolution {
                Resolution::Unresolved => {
                    ctx.sessions[index].link_url = Some(RecordingLink::Unresolved);
                    self.note(ctx, format!("{}: tab opened, URL unresolved", course));
                }
                resolution => {
                    if let Some(url) = resolution.url() {
                        ctx.resolve(index, url.to_string());
                        self.note(ctx, format!("{}: {} ({})", course, url, label));
                    }
                }
            }
            self.publish_counters(ctx, available);
        }

        guard.advance(PassState::Finalizing);
        let summary = PassSummary {
            sessions: ctx.sessions.len(),
            available,
            resolved: ctx.resolved_count(),
            unresolved: ctx.unresolved().len(),
            week: ctx.week,
        };
        let done = format!(
            "Extraction complete: {} of {} recordings resolved, {} pending",
            summary.resolved, summary.available, summary.unresolved
        );
        self.note(ctx, done.clone());
        let notification = Request::ShowNotification {
            title: NOTIFICATION_TITLE.to_string(),
            message: done,
        };
        if let Err(e) = self.link.send(notification).await {
            debug!("Completion notification not delivered: {}", e);
        }
        info!(
            sessions = summary.sessions,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            "Pass finished"
        );
        Ok(summary)
    }

    /// Pair unresolved sessions with captures that arrived late.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome, ExtractError> {
        self.ensure_idle()?;
        if self.last.lock().is_none() {
            return Err(ExtractError::NoPass);
        }
        let captures = self
            .link
            .send(Request::GetCapturedRecordings)
            .await
            .and_then(Response::into_recordings)?;

        let mut last = self.last.lock();
        let ctx = last.as_mut().ok_or(ExtractError::NoPass)?;
        let matched = pair_unresolved(&ctx.sessions, ctx.tokens(), &captures, ctx.assigned());
        for (index, url) in &matched {
            ctx.resolve(*index, url.clone());
            let message = format!("Reconciled {}: {}", ctx.sessions[*index].course, url);
            self.status.log(ctx.log.push(message));
        }
        let still_unresolved = ctx.unresolved();
        let message = format!(
            "Reconciliation matched {}, {} still pending",
            matched.len(),
            still_unresolved.len()
        );
        self.status.log(ctx.log.push(message));
        Ok(ReconcileOutcome {
            matched,
            still_unresolved,
        })
    }

    /// Fill a session with a URL pasted by the operator.
    pub fn apply_manual_url(&self, index: usize, url: &str) -> Result<(), ExtractError> {
        self.ensure_idle()?;
        let url = url.trim();
        if !self.classifier.is_recording_url(url) {
            return Err(ExtractError::InvalidRecordingUrl(url.to_string()));
        }
        let mut last = self.last.lock();
        let ctx = last.as_mut().ok_or(ExtractError::NoPass)?;
        if index >= ctx.sessions.len() {
            return Err(ExtractError::SessionIndex(index));
        }
        ctx.resolve(index, url.to_string());
        let message = format!("Manual link for {}: {}", ctx.sessions[index].course, url);
        self.status.log(ctx.log.push(message));
        Ok(())
    }

    pub fn build_report(&self) -> Result<Report, ExtractError> {
        let last = self.last.lock();
        let ctx = last.as_ref().ok_or(ExtractError::NoPass)?;
        Ok(Report::from_context(ctx, Utc::now()))
    }

    /// Serialize the report and hand it to `sink`. Returns its location.
    pub fn export(&self, sink: &dyn ReportSink) -> Result<String, ExtractError> {
        let report = self.build_report()?;
        let filename = report_filename(&self.file_prefix, report.extraction_info.extracted_at);
        let location = sink.save(&filename, &report.to_json()?)?;
        if let Some(ctx) = self.last.lock().as_mut() {
            self.status.log(ctx.log.push("Data exported successfully"));
        }
        Ok(location)
    }

    /// Ask the coordinator to close every provider tab but this one.
    pub async fn close_zoom_tabs(&self) -> Result<usize, ExtractError> {
        let count = self
            .link
            .send(Request::CloseZoomTabs)
            .await
            .and_then(Response::into_count)?;
        if let Some(ctx) = self.last.lock().as_mut() {
            self.status.log(ctx.log.push(format!("Closed {} Zoom tab(s)", count)));
        }
        Ok(count)
    }

    fn ensure_idle(&self) -> Result<(), ExtractError> {
        match self.state() {
            PassState::Idle => Ok(()),
            _ => Err(ExtractError::PassInProgress),
        }
    }

    fn on_site(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| self.site.matches_host(h)))
            .unwrap_or(false)
    }

    fn note(&self, ctx: &mut ExtractionContext, message: impl Into<String>) {
        let entry = ctx.log.push(message);
        self.status.log(entry);
    }

    fn publish_counters(&self, ctx: &ExtractionContext, available: usize) {
        self.status.counters(StatusCounters {
            sessions: ctx.sessions.len(),
            available,
            resolved: ctx.resolved_count(),
            unresolved: ctx.unresolved().len(),
        });
    }
}

fn new_session(metadata: SessionMetadata, button: Option<&ButtonInfo>, week: Option<u32>) -> Session {
    let available = button.is_some_and(ButtonInfo::available);
    Session {
        course: metadata.course,
        section: metadata.section,
        date: metadata.date,
        start_time: metadata.start_time,
        instructor: metadata.instructor,
        session_type: metadata.session_type,
        status: metadata.status,
        modality: metadata.modality,
        week,
        has_link: available,
        link_url: None,
        button_id: metadata.button_id,
        button_enabled: available,
        extracted_at: Utc::now(),
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
