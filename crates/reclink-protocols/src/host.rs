//! Capability traits the components are written against.
//!
//! The coordinator only sees a [`TabHost`] and a [`Notifier`]; the extractor
//! only sees a [`SchedulePage`] and a [`CoordinatorLink`]. Real browsers and
//! test fakes both plug in here.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::broadcast;

use crate::error::{HostError, MessagingError};
use crate::message::{Envelope, Request, Response};
use crate::types::{TabEvent, TabId, TabInfo};

/// Normalized stream of tab lifecycle events.
pub type TabEventStream = Pin<Box<dyn Stream<Item = TabEvent> + Send>>;

/// Privileged browser tab facility.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// All open tabs.
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, HostError>;

    /// The tab the operator is currently looking at.
    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError>;

    /// Close a tab.
    async fn close_tab(&self, tab_id: &TabId) -> Result<(), HostError>;
}

/// Operator-facing notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<(), HostError>;
}

/// The schedule page, as the extractor needs it.
#[async_trait]
pub trait SchedulePage: Send + Sync {
    /// The tab this page lives in.
    fn tab_id(&self) -> &TabId;

    /// Current page URL.
    async fn current_url(&self) -> Result<String, HostError>;

    /// Serialized live DOM of the page.
    async fn document_html(&self) -> Result<String, HostError>;

    /// Click the element with the given id. Returns `false` if it is missing.
    async fn click_button(&self, button_id: &str) -> Result<bool, HostError>;
}

/// Page-side end of the coordinator message channel.
#[async_trait]
pub trait CoordinatorLink: Send + Sync {
    /// Tab the requests are sent from.
    fn tab_id(&self) -> &TabId;

    /// Send a request and wait for the reply.
    async fn send(&self, request: Request) -> Result<Response, MessagingError>;

    /// Subscribe to coordinator pushes. Envelopes for other tabs must be ignored.
    fn subscribe(&self) -> broadcast::Receiver<Envelope>;
}
