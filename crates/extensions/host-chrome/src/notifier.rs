//! Desktop notifications with a log fallback.

use async_trait::async_trait;
use reclink_protocols::{HostError, Notifier};
use tokio::process::Command;
use tracing::{info, warn};

/// Shows notifications through the platform notifier (`osascript` on macOS,
/// `notify-send` on Linux). Anything that cannot be shown is logged instead.
pub struct DesktopNotifier {
    desktop: bool,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self { desktop: true }
    }

    /// Log every notification and never touch the desktop.
    pub fn log_only() -> Self {
        Self { desktop: false }
    }

    async fn send_desktop(&self, title: &str, message: &str) -> Result<(), HostError> {
        let mut cmd = desktop_command(title, message).ok_or_else(|| {
            HostError::Notification("No desktop notifier on this platform".to_string())
        })?;

        let output = cmd
            .output()
            .await
            .map_err(|e| HostError::Notification(e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(HostError::Notification(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), HostError> {
        if self.desktop {
            match self.send_desktop(title, message).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!("Desktop notification failed: {}", e),
            }
        }
        info!(target: "reclink::notify", "{}: {}", title, message);
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn desktop_command(title: &str, message: &str) -> Option<Command> {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        applescript_escape(message),
        applescript_escape(title)
    );
    let mut cmd = Command::new("osascript");
    cmd.args(["-e", script.as_str()]);
    Some(cmd)
}

#[cfg(target_os = "linux")]
fn desktop_command(title: &str, message: &str) -> Option<Command> {
    let mut cmd = Command::new("notify-send");
    cmd.args([title, message]);
    Some(cmd)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn desktop_command(_title: &str, _message: &str) -> Option<Command> {
    None
}

#[cfg_attr(not(any(target_os = "macos", test)), allow(dead_code))]
fn applescript_escape(text: &str) -> String {
    text.replace('\\', r"\\").replace('"', r#"\""#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_escape() {
        assert_eq!(
            applescript_escape(r#"Say "hi" \ bye"#),
            r#"Say \"hi\" \\ bye"#
        );
    }

    #[tokio::test]
    async fn test_log_only_always_succeeds() {
        let notifier = DesktopNotifier::log_only();
        assert!(notifier.notify("UTEC Extractor", "Found 3 sessions").await.is_ok());
    }

    #[tokio::test]
    async fn test_default_is_desktop() {
        assert!(DesktopNotifier::default().desktop);
    }
}
