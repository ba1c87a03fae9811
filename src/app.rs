//! Wiring: browser connection, coordinator loop and the page-side extractor.

use std::sync::Arc;
use std::time::Duration;

use reclink_config::{Config, ConfigError};
use reclink_coordinator::{
    readiness_of, CloseReport, CommandOutcome, CoordinatorHandle, CoordinatorService, Readiness,
    EXTRACT_LINKS,
};
use reclink_extractor::{Extractor, FileReportSink, PassSummary, TracingStatus, TriggerOutcome};
use reclink_host_chrome::{BrowserError, BrowserManager, BrowserManagerConfig, DesktopNotifier};
use reclink_protocols::{ExtractError, HostError, MessagingError, Notifier, PageMessage, TabId};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long a one-shot extraction waits for its own `extract-links` push.
const PUSH_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Messaging(#[from] MessagingError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No schedule page attached. Open {0} and run `extract` first")]
    NoPage(String),
}

struct AttachedPage {
    tab: TabId,
    extractor: Arc<Extractor>,
    serve: Option<JoinHandle<()>>,
}

/// A running reclink session against the operator's browser.
pub(crate) struct App {
    config: Config,
    browser: Arc<BrowserManager>,
    coordinator: CoordinatorHandle,
    task: JoinHandle<()>,
    page: Option<AttachedPage>,
}

impl App {
    /// Connect to Chrome and start the coordinator on its tab events.
    pub async fn start(config: Config) -> Result<Self, AppError> {
        let browser = Arc::new(BrowserManager::new(BrowserManagerConfig::from_config(
            &config.browser,
        )));
        browser.connect().await?;

        let host = Arc::new(browser.tab_host().await?);
        let events = host.events().await?;
        let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new());

        let service = CoordinatorService::new(&config, host, notifier);
        let (coordinator, task) = service.spawn(events);
        info!("reclink started against {}", browser.config().endpoint());

        Ok(Self {
            config,
            browser,
            coordinator,
            task,
            page: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn readiness(&self) -> Result<Readiness, AppError> {
        Ok(self.coordinator.readiness().await?)
    }

    /// Extractor of the attached schedule page, if any.
    pub fn extractor(&self) -> Result<Arc<Extractor>, AppError> {
        self.page
            .as_ref()
            .map(|p| p.extractor.clone())
            .ok_or_else(|| AppError::NoPage(self.config.site.domain.clone()))
    }

    /// Attach the page component to the active tab when it is the schedule
    /// site. A page already attached to that tab is kept.
    async fn attach_active(&mut self, serve: bool) -> Result<(), AppError> {
        let active = self.browser.active_tab().await?;
        let Some(tab) = active.filter(|t| readiness_of(Some(t), &self.config.site).is_ready())
        else {
            return Ok(());
        };
        if self.page.as_ref().map(|p| &p.tab) == Some(&tab.id) {
            return Ok(());
        }

        let page = Arc::new(self.browser.schedule_page(&tab.id).await?);
        let link = Arc::new(self.coordinator.connect_page(tab.id.clone())?);
        let extractor = Arc::new(Extractor::with_html_source(
            &self.config,
            page,
            link,
            Arc::new(TracingStatus),
        )?);
        let serve = serve.then(|| tokio::spawn(extractor.clone().serve()));

        info!("Attached to schedule tab {} ({})", tab.id, tab.url);
        let previous = self.page.replace(AttachedPage {
            tab: tab.id,
            extractor,
            serve,
        });
        if let Some(task) = previous.and_then(|p| p.serve) {
            task.abort();
        }
        Ok(())
    }

    /// Raise `extract-links` through the coordinator's domain gate. The
    /// attached page runs the pass in the background.
    pub async fn trigger(&mut self) -> Result<CommandOutcome, AppError> {
        self.attach_active(true).await?;
        Ok(self.coordinator.command(EXTRACT_LINKS).await?)
    }

    /// Run one gated pass to completion.
    pub async fn extract_once(&mut self) -> Result<Result<PassSummary, CommandOutcome>, AppError> {
        let mut pushes = self.coordinator.subscribe();
        self.attach_active(false).await?;

        let tab = match self.coordinator.command(EXTRACT_LINKS).await? {
            CommandOutcome::Dispatched(tab) => tab,
            refused => return Ok(Err(refused)),
        };
        wait_for_trigger(&mut pushes, &tab).await?;

        match self.extractor()?.handle_extract_command().await? {
            TriggerOutcome::Completed(summary) => Ok(Ok(summary)),
            TriggerOutcome::AlreadyRunning => Err(ExtractError::PassInProgress.into()),
        }
    }

    /// Write the report of the last pass. Returns the file path.
    pub fn export(&self) -> Result<String, AppError> {
        let sink = FileReportSink::new(self.config.export.output_dir.clone());
        Ok(self.extractor()?.export(&sink)?)
    }

    pub async fn shutdown(self) {
        if let Some(task) = self.page.and_then(|p| p.serve) {
            task.abort();
        }
        self.coordinator.shutdown();
        if let Err(e) = self.task.await {
            warn!("Coordinator task ended abnormally: {}", e);
        }
        // A headless Chrome we launched has no window to close it from.
        let closed = if self.config.browser.headless {
            self.browser.shutdown_chrome().await
        } else {
            self.browser.close().await
        };
        if let Err(e) = closed {
            warn!("Failed to close browser connection: {}", e);
        }
    }
}

async fn wait_for_trigger(
    pushes: &mut broadcast::Receiver<reclink_protocols::Envelope>,
    tab: &TabId,
) -> Result<(), AppError> {
    let wait = async {
        loop {
            match pushes.recv().await {
                Ok(envelope)
                    if &envelope.to == tab
                        && matches!(envelope.message, PageMessage::ExtractLinks) =>
                {
                    return Ok(());
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(MessagingError::ReceiverGone("coordinator".to_string()));
                }
            }
        }
    };
    match tokio::time::timeout(PUSH_WAIT, wait).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(MessagingError::NoReply(EXTRACT_LINKS.to_string()).into()),
    }
}

/// Close every provider tab without starting a session.
pub(crate) async fn close_all_provider_tabs(config: &Config) -> Result<CloseReport, AppError> {
    let browser = BrowserManager::new(BrowserManagerConfig::from_config(&config.browser));
    browser.connect().await?;
    let host = Arc::new(browser.tab_host().await?);
    let service = CoordinatorService::new(config, host, Arc::new(DesktopNotifier::new()));
    let report = service.close_provider_tabs().await?;
    debug!("Close report: {:?}", report);
    browser.close().await?;
    Ok(report)
}
