//! The per-button resolution chain.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reclink_protocols::{
    CapturedRecording, CoordinatorLink, CorrelationToken, Envelope, PageMessage,
    RecordingClassifier, RecordingLink, Request, Response, SchedulePage, SessionMetadata,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::source::{ButtonInfo, SessionSource};

/// How a session's recording link was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// URL embedded in the button markup; no click happened.
    Direct(String),
    /// Pushed by the coordinator with this click's token.
    Captured(String),
    /// Found by the fallback scan after the capture wait ran out.
    Scanned(String),
    Unresolved,
}

impl Resolution {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Direct(url) | Self::Captured(url) | Self::Scanned(url) => Some(url),
            Self::Unresolved => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct(_) => "direct",
            Self::Captured(_) => "captured",
            Self::Scanned(_) => "scanned",
            Self::Unresolved => "unresolved",
        }
    }

    pub fn into_link(self) -> RecordingLink {
        match self {
            Self::Direct(url) | Self::Captured(url) | Self::Scanned(url) => {
                RecordingLink::Resolved(url)
            }
            Self::Unresolved => RecordingLink::Unresolved,
        }
    }
}

/// Result of resolving one button.
#[derive(Debug)]
pub(crate) struct Attempt {
    pub resolution: Resolution,
    /// Token issued for the click, when one happened.
    pub token: Option<CorrelationToken>,
}

pub(crate) struct Resolver<'a> {
    pub page: &'a dyn SchedulePage,
    pub link: &'a dyn CoordinatorLink,
    pub source: &'a dyn SessionSource,
    pub classifier: &'a RecordingClassifier,
    pub capture_timeout: Duration,
}

impl Resolver<'_> {
    /// URL embedded in the button's handler, data attributes or enclosing link.
    pub fn direct(&self, button: &ButtonInfo) -> Option<String> {
        button
            .hints
            .iter()
            .find_map(|hint| self.classifier.extract_from(hint))
    }

    pub async fn resolve(
        &self,
        metadata: SessionMetadata,
        button: &ButtonInfo,
        assigned: &HashSet<String>,
    ) -> Attempt {
        if let Some(url) = self.direct(button) {
            return Attempt {
                resolution: Resolution::Direct(url),
                token: None,
            };
        }

        let baseline = self.scan().await;
        // Subscribe before clicking so an immediate push is not missed.
        let mut pushes = self.link.subscribe();
        let token = match self
            .link
            .send(Request::ExpectRecording { expected: metadata })
            .await
            .and_then(Response::into_token)
        {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Coordinator did not register the click on {}: {}", button.id, e);
                None
            }
        };

        let clicked_at = Utc::now();
        let clicked = match self.page.click_button(&button.id).await {
            Ok(found) => {
                if !found {
                    warn!("Button {} is no longer on the page", button.id);
                }
                found
            }
            Err(e) => {
                warn!("Clicking {} failed: {}", button.id, e);
                false
            }
        };

        if let (true, Some(token)) = (clicked, token) {
            if let Some(url) = self.wait_for_capture(&mut pushes, token).await {
                return Attempt {
                    resolution: Resolution::Captured(url),
                    token: Some(token),
                };
            }
            debug!("No capture for {} within {:?}", button.id, self.capture_timeout);
        }
        if let Some(token) = token {
            self.withdraw(token).await;
        }

        let resolution = match self.fallback(&baseline, token, clicked_at, assigned).await {
            Some(url) => Resolution::Scanned(url),
            None => Resolution::Unresolved,
        };
        Attempt { resolution, token }
    }

    async fn withdraw(&self, token: CorrelationToken) {
        if let Err(e) = self
            .link
            .send(Request::WithdrawExpectation { token })
            .await
        {
            warn!("Could not withdraw token {}: {}", token, e);
        }
    }

    async fn wait_for_capture(
        &self,
        pushes: &mut broadcast::Receiver<Envelope>,
        token: CorrelationToken,
    ) -> Option<String> {
        let deadline = Instant::now() + self.capture_timeout;
        loop {
            let received = match tokio::time::timeout_at(deadline, pushes.recv()).await {
                Ok(received) => received,
                Err(_) => return None,
            };
            match received {
                Ok(Envelope {
                    to,
                    message: PageMessage::RecordingCaptured { recording },
                }) if &to == self.link.tab_id() && recording.token == Some(token) => {
                    return Some(recording.url);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Skipped {} pushes while waiting for a capture", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn fallback(
        &self,
        baseline: &HashSet<String>,
        token: Option<CorrelationToken>,
        clicked_at: DateTime<Utc>,
        assigned: &HashSet<String>,
    ) -> Option<String> {
        let fresh = self
            .scan()
            .await
            .into_iter()
            .find(|url| !baseline.contains(url) && !assigned.contains(url));
        if fresh.is_some() {
            return fresh;
        }

        match self
            .link
            .send(Request::GetCapturedRecordings)
            .await
            .and_then(Response::into_recordings)
        {
            Ok(captures) => pick_capture(&captures, token, clicked_at, assigned),
            Err(e) => {
                warn!("Could not read captured recordings: {}", e);
                None
            }
        }
    }

    /// Recording URLs currently visible in the page.
    async fn scan(&self) -> HashSet<String> {
        match self.page.document_html().await {
            Ok(html) => self
                .source
                .candidate_urls(&html)
                .into_iter()
                .filter(|url| self.classifier.is_recording_url(url))
                .collect(),
            Err(e) => {
                warn!("Page scan failed: {}", e);
                HashSet::new()
            }
        }
    }
}

/// Choose a capture for a click: its own token first, otherwise an untagged
/// capture seen after the click that nobody has claimed.
pub(crate) fn pick_capture(
    captures: &[CapturedRecording],
    token: Option<CorrelationToken>,
    clicked_at: DateTime<Utc>,
    assigned: &HashSet<String>,
) -> Option<String> {
    if let Some(token) = token {
        if let Some(own) = captures.iter().find(|c| c.token == Some(token)) {
            return Some(own.url.clone());
        }
    }
    captures
        .iter()
        .filter(|c| c.token.is_none())
        .filter(|c| c.captured_at >= clicked_at)
        .find(|c| !assigned.contains(&c.url))
        .map(|c| c.url.clone())
}
