//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo, TargetInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;
type HandlerMap = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Events without a session id belong to the browser connection itself.
const BROWSER_SESSION: &str = "";

/// Request side of the WebSocket, shared by the client and its page sessions.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
}

impl Transport {
    /// Send a command and wait for its reply.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// Fetch `/json/version` from a debugging endpoint.
pub async fn fetch_version(endpoint: &str) -> Result<BrowserVersion, CdpError> {
    let url = format!("{}/json/version", endpoint.trim_end_matches('/'));
    debug!("Fetching browser version from {}", url);
    let version = reqwest::get(&url)
        .await
        .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
        .error_for_status()
        .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
        .json()
        .await
        .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;
    Ok(version)
}

/// Fetch `/json/list`. Chrome orders it by most recent activation.
pub async fn fetch_pages(endpoint: &str) -> Result<Vec<PageInfo>, CdpError> {
    let url = format!("{}/json/list", endpoint.trim_end_matches('/'));
    let pages = reqwest::get(&url).await?.error_for_status()?.json().await?;
    Ok(pages)
}

/// CDP client bound to one browser connection.
pub struct CdpClient {
    http_endpoint: String,
    browser_ws_url: String,
    transport: Arc<Transport>,
    event_handlers: HandlerMap,
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let version = fetch_version(&http_endpoint).await?;
        debug!("Connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;
        let (ws_stream, _) = tokio_tungstenite::connect_async(browser_ws_url.as_str())
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: HandlerMap = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, event_handlers).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            transport: Arc::new(Transport {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                request_id: AtomicU64::new(1),
                pending,
            }),
            event_handlers,
            _recv_task: recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, event_handlers: HandlerMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => Self::dispatch(resp, &pending, &event_handlers).await,
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Dropping the senders fails outstanding calls with SessionClosed
        // and ends every event stream.
        pending.lock().clear();
        event_handlers.write().await.clear();
    }

    async fn dispatch(resp: CdpResponse, pending: &PendingMap, event_handlers: &HandlerMap) {
        if let Some(id) = resp.id {
            let waiter = pending.lock().remove(&id);
            if let Some(tx) = waiter {
                let result = match resp.error {
                    Some(error) => Err(CdpError::Protocol {
                        code: error.code,
                        message: error.message,
                    }),
                    None => Ok(resp.result.unwrap_or(Value::Null)),
                };
                let _ = tx.send(result);
            }
        } else if resp.method.is_some() {
            let key = resp.session_id.clone().unwrap_or_default();
            let handlers = event_handlers.read().await;
            if let Some(tx) = handlers.get(&key) {
                let _ = tx.send(resp);
            }
        }
    }

    /// Send a browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.call(method, params, None).await
    }

    pub fn http_endpoint(&self) -> &str {
        &self.http_endpoint
    }

    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// Receive browser-level events (`Target.*`). A new subscription
    /// replaces the previous one.
    pub async fn subscribe_browser_events(&self) -> mpsc::UnboundedReceiver<CdpResponse> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_handlers
            .write()
            .await
            .insert(BROWSER_SESSION.to_string(), tx);
        rx
    }

    /// Ask Chrome to report target creation, changes and destruction.
    pub async fn discover_targets(&self) -> Result<(), CdpError> {
        self.call("Target.setDiscoverTargets", Some(json!({"discover": true})))
            .await?;
        Ok(())
    }

    /// Pages in activation order.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        fetch_pages(&self.http_endpoint).await
    }

    pub async fn get_targets(&self) -> Result<Vec<TargetInfo>, CdpError> {
        let result = self.call("Target.getTargets", None).await?;
        let targets: Vec<TargetInfo> = serde_json::from_value(result["targetInfos"].clone())?;
        Ok(targets)
    }

    /// Attach to an existing page and enable the domains the session uses.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await
            .map_err(|e| match e {
                CdpError::Protocol { .. } => CdpError::PageNotFound(target_id.to_string()),
                other => other,
            })?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_handlers
            .write()
            .await
            .insert(session_id.clone(), event_tx);

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.transport.clone(),
            event_rx,
        );
        session.enable_domains().await?;
        Ok(session)
    }

    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await
            .map_err(|e| match e {
                CdpError::Protocol { .. } => CdpError::PageNotFound(target_id.to_string()),
                other => other,
            })?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_pages_keeps_activation_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "A", "type": "page", "title": "Horario", "url": "https://conference.utec.edu.pe/horario"},
                {"id": "B", "type": "page", "title": "Zoom", "url": "https://utec.zoom.us/rec/share/x"}
            ])))
            .mount(&server)
            .await;

        let pages = fetch_pages(&format!("{}/", server.uri())).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].id, "A");
        assert_eq!(pages[1].to_tab().url, "https://utec.zoom.us/rec/share/x");
    }

    #[tokio::test]
    async fn test_fetch_version_reports_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_version(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CdpError::ChromeNotAvailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "Chrome/126.0.0.0",
                "Protocol-Version": "1.3",
                "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/x"
            })))
            .mount(&server)
            .await;

        let version = fetch_version(&server.uri()).await.unwrap();
        assert_eq!(version.browser, "Chrome/126.0.0.0");
    }
}
