//! CDP protocol types and message definitions.

use reclink_protocols::{TabId, TabInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CDP request message.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Anything Chrome sends back: a reply (has `id`) or an event (has `method`).
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    pub params: Option<Value>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
    pub data: Option<String>,
}

/// Target info from the `Target` domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub target_id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub attached: Option<bool>,
    /// Target that opened this one (`window.open`, `target=_blank`).
    pub opener_id: Option<String>,
    pub browser_context_id: Option<String>,
}

impl TargetInfo {
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }

    pub fn to_tab(&self) -> TabInfo {
        TabInfo {
            id: TabId::new(self.target_id.clone()),
            url: self.url.clone(),
            title: self.title.clone(),
            opener: self.opener_id.clone().map(TabId::new),
        }
    }
}

/// Page info from the `/json/list` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

impl PageInfo {
    pub fn to_tab(&self) -> TabInfo {
        TabInfo::new(self.id.clone(), self.url.clone()).with_title(self.title.clone())
    }
}

/// Browser version info.
///
/// Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version")]
    pub protocol_version: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_info_with_opener() {
        let info: TargetInfo = serde_json::from_value(json!({
            "targetId": "C0FFEE",
            "type": "page",
            "title": "",
            "url": "about:blank",
            "attached": false,
            "openerId": "SCHEDULE",
            "canAccessOpener": true,
            "browserContextId": "ctx"
        }))
        .unwrap();

        assert!(info.is_page());
        let tab = info.to_tab();
        assert_eq!(tab.id.as_str(), "C0FFEE");
        assert_eq!(tab.opener.as_ref().map(|t| t.as_str()), Some("SCHEDULE"));
    }

    #[test]
    fn test_target_info_without_opener() {
        let info: TargetInfo = serde_json::from_value(json!({
            "targetId": "SW",
            "type": "service_worker",
            "title": "sw",
            "url": "https://conference.utec.edu.pe/sw.js"
        }))
        .unwrap();

        assert!(!info.is_page());
        assert!(info.to_tab().opener.is_none());
    }

    #[test]
    fn test_request_serialization_skips_empty_fields() {
        let req = CdpRequest {
            id: 7,
            method: "Target.getTargets".to_string(),
            params: None,
            session_id: None,
        };
        let text = serde_json::to_string(&req).unwrap();
        assert_eq!(text, r#"{"id":7,"method":"Target.getTargets"}"#);
    }

    #[test]
    fn test_browser_version_pascal_case() {
        let version: BrowserVersion = serde_json::from_value(json!({
            "Browser": "Chrome/126.0.0.0",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0",
            "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
        }))
        .unwrap();
        assert_eq!(version.protocol_version, "1.3");
        assert!(version.web_socket_debugger_url.starts_with("ws://"));
    }
}
