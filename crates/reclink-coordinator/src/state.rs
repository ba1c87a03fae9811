//! Coordinator state and the classification-and-capture routine.

use std::collections::{HashMap, HashSet};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reclink_config::Config;
use reclink_protocols::{
    CapturedRecording, CorrelationToken, Envelope, PageMessage, RecordingClassifier,
    SessionMetadata, TabEvent, TabId, TabInfo,
};
use tracing::{debug, info};

use crate::correlation::{Expectation, ExpectationQueue};

/// Timing knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub retention: Duration,
    pub close_tab_delay: StdDuration,
    pub expectation_ttl: Duration,
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retention: Duration::seconds(config.capture.retention_secs as i64),
            close_tab_delay: StdDuration::from_millis(config.capture.close_tab_delay_ms),
            expectation_ttl: Duration::seconds(config.capture.expectation_ttl_secs as i64),
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Side effects requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver a message to a page; delivery is best-effort.
    Push(Envelope),
    /// Close a spawned recording tab after the configured delay.
    CloseTabLater(TabId),
}

/// Single-owner coordinator state.
#[derive(Debug)]
pub struct Coordinator {
    settings: CoordinatorSettings,
    classifier: RecordingClassifier,
    captures: Vec<CapturedRecording>,
    extraction_tab: Option<TabId>,
    children: HashSet<TabId>,
    // Tabs already captured or closed; later events for them are noise.
    settled: HashSet<TabId>,
    bindings: HashMap<TabId, Expectation>,
    expectations: ExpectationQueue,
}

impl Coordinator {
    pub fn new(settings: CoordinatorSettings, classifier: RecordingClassifier) -> Self {
        let expectations = ExpectationQueue::new(settings.expectation_ttl);
        Self {
            settings,
            classifier,
            captures: Vec::new(),
            extraction_tab: None,
            children: HashSet::new(),
            settled: HashSet::new(),
            bindings: HashMap::new(),
            expectations,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let classifier = RecordingClassifier::new(
            config.provider.domain.clone(),
            config.provider.institution_host.clone(),
            config.provider.recording_path_markers.clone(),
        );
        Self::new(CoordinatorSettings::from_config(config), classifier)
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &RecordingClassifier {
        &self.classifier
    }

    pub fn extraction_tab(&self) -> Option<&TabId> {
        self.extraction_tab.as_ref()
    }

    /// Track `tab` as the extraction tab. This marks a new pass, so stale
    /// captures are purged here.
    pub fn set_extraction_tab(&mut self, tab: TabId, now: DateTime<Utc>) {
        if self.extraction_tab.as_ref() != Some(&tab) {
            self.children.clear();
            self.settled.clear();
            self.bindings.clear();
        }
        info!("Tracking extraction tab {}", tab);
        self.extraction_tab = Some(tab);
        self.purge_expired(now);
    }

    /// Register an imminent click and return the token its capture will carry.
    pub fn expect_recording(
        &mut self,
        metadata: SessionMetadata,
        now: DateTime<Utc>,
    ) -> CorrelationToken {
        let token = self.expectations.issue(metadata, now);
        debug!(
            "Expecting recording {} ({} pending)",
            token,
            self.expectations.len()
        );
        token
    }

    /// Give back a click's token when its tab never appeared. A tab that
    /// already bound the token keeps it.
    pub fn withdraw_expectation(&mut self, token: CorrelationToken) -> bool {
        let withdrawn = self.expectations.withdraw(token);
        if withdrawn {
            debug!("Withdrew unclaimed token {}", token);
        }
        withdrawn
    }

    pub fn captured_recordings(&self) -> Vec<CapturedRecording> {
        self.captures.clone()
    }

    pub fn clear_captured_recordings(&mut self) {
        debug!("Clearing {} capture(s)", self.captures.len());
        self.captures.clear();
        self.expectations.clear();
        self.bindings.clear();
    }

    /// Drop captures older than the retention window. Returns how many went.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let retention = self.settings.retention;
        let before = self.captures.len();
        self.captures.retain(|c| now - c.captured_at <= retention);
        let purged = before - self.captures.len();
        if purged > 0 {
            info!("Purged {} capture(s) past retention", purged);
        }
        purged
    }

    /// Provider tabs to close, never including the extraction tab.
    pub fn provider_tabs_to_close(&self, tabs: &[TabInfo]) -> Vec<TabId> {
        tabs.iter()
            .filter(|t| Some(&t.id) != self.extraction_tab.as_ref())
            .filter(|t| self.classifier.is_provider_url(&t.url))
            .map(|t| t.id.clone())
            .collect()
    }

    /// Apply one host tab event.
    pub fn observe(&mut self, event: TabEvent, now: DateTime<Utc>) -> Vec<Effect> {
        match event {
            TabEvent::Removed(id) => {
                self.forget(&id);
                Vec::new()
            }
            TabEvent::Created(tab) => {
                if !self.adopt(&tab, true, now) {
                    return Vec::new();
                }
                self.capture(tab, now)
            }
            TabEvent::Updated(tab) | TabEvent::Navigated(tab) => {
                if !self.children.contains(&tab.id) && !self.adopt(&tab, false, now) {
                    return Vec::new();
                }
                self.capture(tab, now)
            }
        }
    }

    fn forget(&mut self, id: &TabId) {
        if self.extraction_tab.as_ref() == Some(id) {
            info!("Extraction tab {} closed, tracking cleared", id);
            self.extraction_tab = None;
            self.children.clear();
            self.settled.clear();
            self.bindings.clear();
            return;
        }
        self.children.remove(id);
        self.settled.remove(id);
        if let Some(binding) = self.bindings.remove(id) {
            debug!("Tab {} closed before capture, token {} dropped", id, binding.token);
        }
    }

    /// Decide whether `tab` was spawned from the extraction tab and, if so,
    /// start tracking it and bind the oldest pending expectation.
    fn adopt(&mut self, tab: &TabInfo, created: bool, now: DateTime<Utc>) -> bool {
        let Some(parent) = self.extraction_tab.as_ref() else {
            return false;
        };
        if &tab.id == parent || self.settled.contains(&tab.id) {
            return false;
        }
        let spawned = match tab.opener.as_ref() {
            Some(opener) => opener == parent,
            None => created && self.expectations.has_live(now),
        };
        if !spawned {
            return false;
        }

        self.children.insert(tab.id.clone());
        if let Some(expectation) = self.expectations.claim(now) {
            debug!("Tab {} bound to token {}", tab.id, expectation.token);
            self.bindings.insert(tab.id.clone(), expectation);
        }
        true
    }

    fn capture(&mut self, tab: TabInfo, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.classifier.is_recording_url(&tab.url) {
            return Vec::new();
        }
        self.children.remove(&tab.id);
        self.settled.insert(tab.id.clone());
        let binding = self
            .bindings
            .remove(&tab.id)
            .or_else(|| self.expectations.claim(now));

        if self.captures.iter().any(|c| c.url == tab.url) {
            debug!("Recording {} already captured", tab.url);
            return vec![Effect::CloseTabLater(tab.id)];
        }

        let (token, expected) = match binding {
            Some(e) => (Some(e.token), Some(e.metadata)),
            None => (None, None),
        };
        let recording = CapturedRecording {
            url: tab.url,
            source_tab_id: tab.id.clone(),
            captured_at: now,
            display_title: tab.title,
            token,
            expected,
        };
        info!(
            "Captured recording {} from tab {} (token {})",
            recording.url,
            recording.source_tab_id,
            recording
                .token
                .map(|t| t.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        self.captures.push(recording.clone());

        let mut effects = Vec::with_capacity(2);
        if let Some(to) = self.extraction_tab.clone() {
            effects.push(Effect::Push(Envelope {
                to,
                message: PageMessage::RecordingCaptured { recording },
            }));
        }
        effects.push(Effect::CloseTabLater(tab.id));
        effects
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
