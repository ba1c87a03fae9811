//! BrowserManager page attachment and host construction.

use std::sync::Arc;

use reclink_protocols::{TabId, TabInfo};
use tracing::debug;

use super::{BrowserError, BrowserManager};
use crate::cdp::PageSession;
use crate::page::ChromeSchedulePage;
use crate::tabs::{pick_active, ChromeTabHost};

impl BrowserManager {
    /// Tab host over the current connection.
    pub async fn tab_host(&self) -> Result<ChromeTabHost, BrowserError> {
        Ok(ChromeTabHost::new(self.client().await?))
    }

    /// The page the operator is looking at.
    pub async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError> {
        let pages = self.client().await?.list_pages().await?;
        Ok(pick_active(&pages))
    }

    /// Attach to a tab, reusing an existing session.
    pub async fn attach(&self, tab_id: &TabId) -> Result<Arc<PageSession>, BrowserError> {
        if let Some(session) = self.pages.read().await.get(tab_id.as_str()) {
            return Ok(session.clone());
        }

        let client = self.client().await?;
        let session = Arc::new(client.attach_page(tab_id.as_str()).await?);
        self.pages
            .write()
            .await
            .insert(tab_id.as_str().to_string(), session.clone());

        debug!("Attached to tab {}", tab_id);
        Ok(session)
    }

    /// Schedule page view of a tab.
    pub async fn schedule_page(&self, tab_id: &TabId) -> Result<ChromeSchedulePage, BrowserError> {
        let session = self.attach(tab_id).await?;
        Ok(ChromeSchedulePage::new(tab_id.clone(), session))
    }
}
