//! Notification channels.
//!
//! Two delivery mechanisms exist: a desktop channel that shells out to the
//! platform notifier, and a console channel that just prints. One of them is
//! selected at startup.

mod console;
mod desktop;

pub use console::ConsoleChannel;
pub use desktop::DesktopChannel;

use async_trait::async_trait;

use super::events::NotificationEvent;
use crate::Result;

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Deliver a notification through this channel.
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
}
