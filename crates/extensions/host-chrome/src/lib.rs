//! Chrome host for reclink.
//!
//! Drives the operator's own Chrome/Chromium over the DevTools Protocol, so
//! the schedule site session and its cookies are the real ones.
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │     reclink     │ ◄──────────────► │   Chrome/Edge    │
//! │  (this crate)   │       CDP        │ (operator's tabs)│
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! - [`ChromeTabHost`] lists, closes and watches tabs (`Target` domain).
//! - [`ChromeSchedulePage`] reads and clicks the schedule page (`Runtime`).
//! - [`DesktopNotifier`] shows operator notifications.
//! - [`BrowserManager`] connects, launching Chrome with a persistent profile
//!   when nothing listens on the debug port.

pub mod cdp;
mod manager;
mod notifier;
mod page;
mod tabs;

pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
pub use notifier::DesktopNotifier;
pub use page::ChromeSchedulePage;
pub use tabs::{pick_active, tab_event_from, ChromeTabHost};
