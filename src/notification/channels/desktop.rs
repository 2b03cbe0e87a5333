//! Desktop notification channel.
//!
//! Shells out to `notify-send`, the freedesktop notification client. The
//! spawn is bounded; any failure surfaces to the dispatcher, which falls
//! back to the console channel.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::NotificationChannel;
use crate::notification::events::NotificationEvent;
use crate::{Error, Result};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Channel delivering freedesktop notifications via `notify-send`.
pub struct DesktopChannel;

impl DesktopChannel {
    /// Whether `notify-send` is on PATH.
    pub fn available() -> bool {
        #[cfg(unix)]
        {
            std::env::var_os("PATH")
                .map(|paths| {
                    std::env::split_paths(&paths).any(|dir| dir.join("notify-send").is_file())
                })
                .unwrap_or(false)
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

#[async_trait]
impl NotificationChannel for DesktopChannel {
    fn channel_type(&self) -> &'static str {
        "desktop"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        debug!(event_type = event.event_type(), "Sending desktop notification");

        let status = timeout(
            SEND_TIMEOUT,
            Command::new("notify-send")
                .arg("-u")
                .arg(event.urgency().as_str())
                .arg("-a")
                .arg("wifi-sentry")
                .arg(event.title())
                .arg(event.body())
                .status(),
        )
        .await
        .map_err(|_| Error::notification("notify-send timed out"))?
        .map_err(|e| Error::notification(format!("failed to spawn notify-send: {e}")))?;

        if !status.success() {
            return Err(Error::notification(format!(
                "notify-send exited with {status}"
            )));
        }
        Ok(())
    }
}
