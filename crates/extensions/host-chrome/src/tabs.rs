//! Chrome implementation of the privileged tab facility.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reclink_protocols::{HostError, TabEvent, TabEventStream, TabHost, TabId, TabInfo};
use tracing::{debug, trace};

use crate::cdp::{CdpClient, CdpResponse, PageInfo, TargetInfo};

/// Tab host backed by the `Target` domain of a CDP connection.
pub struct ChromeTabHost {
    client: Arc<CdpClient>,
}

impl ChromeTabHost {
    pub fn new(client: Arc<CdpClient>) -> Self {
        Self { client }
    }

    /// Start target discovery and stream page lifecycle events.
    ///
    /// Chrome replays a `targetCreated` for every existing target first.
    pub async fn events(&self) -> Result<TabEventStream, HostError> {
        let rx = self.client.subscribe_browser_events().await;
        self.client.discover_targets().await?;
        debug!("Target discovery enabled");

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .filter_map(|event| futures::future::ready(tab_event_from(&event)));

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl TabHost for ChromeTabHost {
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, HostError> {
        let targets = self.client.get_targets().await?;
        Ok(targets
            .iter()
            .filter(|t| t.is_page())
            .map(TargetInfo::to_tab)
            .collect())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError> {
        let pages = self.client.list_pages().await?;
        Ok(pick_active(&pages))
    }

    async fn close_tab(&self, tab_id: &TabId) -> Result<(), HostError> {
        self.client.close_page(tab_id.as_str()).await?;
        debug!("Closed tab {}", tab_id);
        Ok(())
    }
}

/// Normalize a browser-level CDP event. Non-page targets are dropped.
pub fn tab_event_from(event: &CdpResponse) -> Option<TabEvent> {
    let method = event.method.as_deref()?;
    let params = event.params.as_ref()?;

    let page_target = || {
        serde_json::from_value::<TargetInfo>(params["targetInfo"].clone())
            .ok()
            .filter(TargetInfo::is_page)
            .map(|t| t.to_tab())
    };

    let normalized = match method {
        "Target.targetCreated" => page_target().map(TabEvent::Created),
        "Target.targetInfoChanged" => page_target().map(TabEvent::Updated),
        "Target.targetDestroyed" => params["targetId"]
            .as_str()
            .map(|id| TabEvent::Removed(TabId::new(id))),
        _ => None,
    };

    trace!("{} -> {:?}", method, normalized);
    normalized
}

/// First real page in `/json/list` order, which Chrome keeps sorted by
/// most recent activation.
pub fn pick_active(pages: &[PageInfo]) -> Option<TabInfo> {
    pages
        .iter()
        .filter(|p| p.page_type == "page")
        .find(|p| !p.url.starts_with("devtools://"))
        .map(PageInfo::to_tab)
}

#[cfg(test)]
#[path = "tabs_tests.rs"]
mod tests;
