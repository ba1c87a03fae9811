//! Schedule page backed by an attached CDP session.

use std::sync::Arc;

use async_trait::async_trait;
use reclink_protocols::{HostError, SchedulePage, TabId};
use tracing::debug;

use crate::cdp::{CdpError, PageSession};

pub struct ChromeSchedulePage {
    tab_id: TabId,
    session: Arc<PageSession>,
}

impl ChromeSchedulePage {
    pub fn new(tab_id: TabId, session: Arc<PageSession>) -> Self {
        Self { tab_id, session }
    }
}

#[async_trait]
impl SchedulePage for ChromeSchedulePage {
    fn tab_id(&self) -> &TabId {
        &self.tab_id
    }

    async fn current_url(&self) -> Result<String, HostError> {
        Ok(self.session.get_url().await?)
    }

    async fn document_html(&self) -> Result<String, HostError> {
        self.session.wait_for_load().await?;
        Ok(self.session.get_content().await?)
    }

    async fn click_button(&self, button_id: &str) -> Result<bool, HostError> {
        let expression = click_expression(button_id).map_err(CdpError::from)?;
        let clicked = self.session.evaluate_with_gesture(&expression).await?;
        debug!("Clicked #{}: {}", button_id, clicked);
        Ok(clicked.as_bool().unwrap_or(false))
    }
}

/// Script that clicks the element with `id` and reports whether it existed.
pub(crate) fn click_expression(id: &str) -> Result<String, serde_json::Error> {
    let literal = serde_json::to_string(id)?;
    Ok(format!(
        "(() => {{ const el = document.getElementById({}); if (!el) return false; el.click(); return true; }})()",
        literal
    ))
}
