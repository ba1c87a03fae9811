//! The coordinator event loop.
//!
//! One task owns the [`Coordinator`]. Page requests and operator commands
//! arrive on an mpsc channel with a oneshot reply. Host tab events arrive on
//! a stream. Pushes to pages go out on a broadcast channel addressed by tab.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use reclink_config::{Config, SiteConfig};
use reclink_protocols::{
    CoordinatorLink, Envelope, HostError, MessagingError, Notifier, PageMessage, Request,
    Response, TabEvent, TabEventStream, TabHost, TabId, NOTIFICATION_TITLE,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::{readiness_of, CommandOutcome, Readiness, EXTRACT_LINKS};
use crate::state::{Coordinator, Effect};

const PUSH_CAPACITY: usize = 64;

enum Command {
    Page {
        from: TabId,
        request: Request,
        reply: oneshot::Sender<Response>,
    },
    Connect(TabId),
    Disconnect(TabId),
    Operator {
        name: String,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Readiness {
        reply: oneshot::Sender<Result<Readiness, HostError>>,
    },
    Shutdown,
}

/// Outcome of closing provider tabs.
#[derive(Debug, Default)]
pub struct CloseReport {
    pub closed: usize,
    pub failures: Vec<(TabId, HostError)>,
}

/// Owns the coordinator state and its collaborators.
pub struct CoordinatorService {
    state: Coordinator,
    site: SiteConfig,
    host: Arc<dyn TabHost>,
    notifier: Arc<dyn Notifier>,
    pages: HashSet<TabId>,
    pushes: broadcast::Sender<Envelope>,
}

impl CoordinatorService {
    pub fn new(config: &Config, host: Arc<dyn TabHost>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_state(
            Coordinator::from_config(config),
            config.site.clone(),
            host,
            notifier,
        )
    }

    pub fn with_state(
        state: Coordinator,
        site: SiteConfig,
        host: Arc<dyn TabHost>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (pushes, _) = broadcast::channel(PUSH_CAPACITY);
        Self {
            state,
            site,
            host,
            notifier,
            pages: HashSet::new(),
            pushes,
        }
    }

    /// Start the loop on the current runtime.
    pub fn spawn(self, events: TabEventStream) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = CoordinatorHandle {
            tx,
            pushes: self.pushes.clone(),
        };
        let task = tokio::spawn(self.run(rx, events));
        (handle, task)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>, mut events: TabEventStream) {
        info!("Coordinator started");
        let mut events_open = true;
        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.dispatch(command).await,
                },
                event = events.next(), if events_open => match event {
                    Some(event) => self.on_tab_event(event),
                    None => {
                        warn!("Tab event stream ended; captures will stop");
                        events_open = false;
                    }
                },
            }
        }
        info!("Coordinator stopped");
    }

    async fn dispatch(&mut self, command: Command) {
        match command {
            Command::Page {
                from,
                request,
                reply,
            } => {
                let response = self.handle_request(&from, request).await;
                if reply.send(response).is_err() {
                    debug!("Page {} stopped waiting for a reply", from);
                }
            }
            Command::Connect(tab) => {
                debug!("Page connected in tab {}", tab);
                self.pages.insert(tab);
            }
            Command::Disconnect(tab) => {
                debug!("Page disconnected from tab {}", tab);
                self.pages.remove(&tab);
            }
            Command::Operator { name, reply } => {
                let outcome = self.handle_operator(&name).await;
                let _ = reply.send(outcome);
            }
            Command::Readiness { reply } => {
                let readiness = self
                    .host
                    .active_tab()
                    .await
                    .map(|tab| readiness_of(tab.as_ref(), &self.site));
                let _ = reply.send(readiness);
            }
            Command::Shutdown => {}
        }
    }

    fn on_tab_event(&mut self, event: TabEvent) {
        let effects = self.state.observe(event, Utc::now());
        self.apply(effects);
    }

    async fn handle_request(&mut self, from: &TabId, request: Request) -> Response {
        debug!("{} from tab {}", request.action(), from);
        match request {
            Request::SetExtractionTab => {
                self.state.set_extraction_tab(from.clone(), Utc::now());
                Response::ok()
            }
            Request::ExpectRecording { expected } => Response::Expecting {
                success: true,
                token: self.state.expect_recording(expected, Utc::now()),
            },
            Request::WithdrawExpectation { token } => {
                self.state.withdraw_expectation(token);
                Response::ok()
            }
            Request::GetCapturedRecordings => Response::Recordings {
                success: true,
                recordings: self.state.captured_recordings(),
            },
            Request::ClearCapturedRecordings => {
                self.state.clear_captured_recordings();
                Response::ok()
            }
            Request::CloseZoomTabs => match self.close_provider_tabs().await {
                Ok(report) => Response::Closed {
                    success: true,
                    count: report.closed,
                },
                Err(e) => {
                    warn!("Could not list tabs: {}", e);
                    Response::Closed {
                        success: false,
                        count: 0,
                    }
                }
            },
            Request::ShowNotification { title, message } => {
                self.notify(&title, &message).await;
                Response::NoReply
            }
        }
    }

    /// Close every provider tab except the extraction tab.
    pub async fn close_provider_tabs(&self) -> Result<CloseReport, HostError> {
        let tabs = self.host.list_tabs().await?;
        let mut report = CloseReport::default();
        for id in self.state.provider_tabs_to_close(&tabs) {
            match self.host.close_tab(&id).await {
                Ok(()) => report.closed += 1,
                Err(e) => {
                    warn!("Failed to close tab {}: {}", id, e);
                    report.failures.push((id, e));
                }
            }
        }
        info!(
            "Closed {} provider tab(s), {} failure(s)",
            report.closed,
            report.failures.len()
        );
        Ok(report)
    }

    async fn handle_operator(&mut self, name: &str) -> CommandOutcome {
        if name != EXTRACT_LINKS {
            warn!("Unknown command: {}", name);
            return CommandOutcome::Unknown(name.to_string());
        }

        let active = match self.host.active_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                warn!("Active tab unavailable: {}", e);
                return CommandOutcome::HostUnavailable(e.to_string());
            }
        };
        let tab = match active {
            Some(tab) if readiness_of(Some(&tab), &self.site).is_ready() => tab,
            _ => {
                let message = format!("Please navigate to {} first", self.site.domain);
                self.notify(NOTIFICATION_TITLE, &message).await;
                return CommandOutcome::WrongDomain;
            }
        };

        let envelope = Envelope {
            to: tab.id.clone(),
            message: PageMessage::ExtractLinks,
        };
        if !self.pages.contains(&tab.id) || self.pushes.send(envelope).is_err() {
            self.notify(NOTIFICATION_TITLE, "Please refresh the page and try again")
                .await;
            return CommandOutcome::PageNotConnected;
        }
        info!("Extraction requested in tab {}", tab.id);
        CommandOutcome::Dispatched(tab.id)
    }

    async fn notify(&self, title: &str, message: &str) {
        if let Err(e) = self.notifier.notify(title, message).await {
            warn!("Notification failed: {}", e);
        }
    }

    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Push(envelope) => {
                    let to = envelope.to.clone();
                    if self.pushes.send(envelope).is_err() {
                        debug!("No page listening in tab {}", to);
                    }
                }
                Effect::CloseTabLater(id) => {
                    let host = Arc::clone(&self.host);
                    let delay = self.state.settings().close_tab_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        if let Err(e) = host.close_tab(&id).await {
                            debug!("Could not close tab {}: {}", id, e);
                        }
                    });
                }
            }
        }
    }
}

/// Cloneable handle to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Command>,
    pushes: broadcast::Sender<Envelope>,
}

impl CoordinatorHandle {
    /// Register the page component running in `tab`.
    pub fn connect_page(&self, tab: TabId) -> Result<PageLink, MessagingError> {
        self.tx
            .send(Command::Connect(tab.clone()))
            .map_err(|_| gone())?;
        Ok(PageLink {
            tab_id: tab,
            tx: self.tx.clone(),
            pushes: self.pushes.clone(),
        })
    }

    /// Run an operator command such as `extract-links`.
    pub async fn command(&self, name: &str) -> Result<CommandOutcome, MessagingError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Operator {
                name: name.to_string(),
                reply,
            })
            .map_err(|_| gone())?;
        rx.await.map_err(|_| MessagingError::NoReply(name.to_string()))
    }

    pub async fn readiness(&self) -> Result<Readiness, MessagingError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Readiness { reply })
            .map_err(|_| gone())?;
        match rx.await {
            Ok(Ok(readiness)) => Ok(readiness),
            Ok(Err(e)) => {
                warn!("Readiness check failed: {}", e);
                Ok(Readiness::Unknown)
            }
            Err(_) => Err(MessagingError::NoReply("readiness".to_string())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.pushes.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

fn gone() -> MessagingError {
    MessagingError::ReceiverGone("coordinator".to_string())
}

/// A page component's connection to the coordinator.
///
/// Pushes are only seen by receivers subscribed before they are sent.
/// Dropping the link unregisters the page.
pub struct PageLink {
    tab_id: TabId,
    tx: mpsc::UnboundedSender<Command>,
    pushes: broadcast::Sender<Envelope>,
}

#[async_trait]
impl CoordinatorLink for PageLink {
    fn tab_id(&self) -> &TabId {
        &self.tab_id
    }

    async fn send(&self, request: Request) -> Result<Response, MessagingError> {
        let action = request.action();
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Page {
                from: self.tab_id.clone(),
                request,
                reply,
            })
            .map_err(|_| gone())?;
        rx.await
            .map_err(|_| MessagingError::NoReply(action.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.pushes.subscribe()
    }
}

impl Drop for PageLink {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Disconnect(self.tab_id.clone()));
    }
}
