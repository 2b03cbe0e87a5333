//! Console notification channel.

use async_trait::async_trait;

use super::NotificationChannel;
use crate::Result;
use crate::notification::events::NotificationEvent;

/// Fallback channel that prints notifications to stdout. Cannot fail.
pub struct ConsoleChannel;

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn channel_type(&self) -> &'static str {
        "console"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        println!("🔔 [{}] {}: {}", event.urgency().as_str(), event.title(), event.body());
        Ok(())
    }
}
