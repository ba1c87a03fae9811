//! Browser instance manager.
//!
//! Connects to Chrome on the debugging port. When nothing is listening it
//! launches Chrome with a persistent profile, so the schedule-site login
//! survives between runs.

mod manager_core;
mod manager_pages;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
