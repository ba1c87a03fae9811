//! Chrome DevTools Protocol (CDP) client.
//!
//! Talks to an already running Chrome/Chromium over its debugging WebSocket.
//! Only the parts reclink needs are covered: target discovery and lifecycle
//! events, attaching to a page, and evaluating script in it.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let mut events = client.subscribe_browser_events().await;
//! client.discover_targets().await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::{fetch_pages, fetch_version, CdpClient};
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
