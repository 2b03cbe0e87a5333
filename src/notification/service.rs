//! Notification dispatch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::channels::{ConsoleChannel, DesktopChannel, NotificationChannel};
use super::events::NotificationEvent;
use crate::config::NotificationSettings;

/// Best-effort notification dispatcher.
///
/// Honors the master switch and per-event toggles from the configuration.
/// Channel failures degrade to a console print; nothing ever propagates to
/// the login flow.
#[derive(Clone)]
pub struct Notifier {
    settings: NotificationSettings,
    channel: Arc<dyn NotificationChannel>,
}

impl Notifier {
    /// Create a notifier, picking the delivery channel once at startup.
    pub fn new(settings: NotificationSettings) -> Self {
        let channel: Arc<dyn NotificationChannel> = if DesktopChannel::available() {
            Arc::new(DesktopChannel)
        } else {
            Arc::new(ConsoleChannel)
        };
        info!(channel = channel.channel_type(), "Notification channel selected");
        Self { settings, channel }
    }

    /// Create a notifier with an explicit channel.
    pub fn with_channel(
        settings: NotificationSettings,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self { settings, channel }
    }

    /// Deliver `event` if its toggles allow it.
    ///
    /// Returns whether a notification actually went out (through the
    /// primary channel or the console fallback). Never errors.
    pub async fn notify(&self, event: &NotificationEvent) -> bool {
        if !event.is_enabled(&self.settings) {
            debug!(event_type = event.event_type(), "Notification suppressed by settings");
            return false;
        }

        match self.channel.send(event).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    channel = self.channel.channel_type(),
                    error = %e,
                    "Notification delivery failed; falling back to console"
                );
                // The console channel cannot fail.
                let _ = ConsoleChannel.send(event).await;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChannel {
        sent: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for CountingChannel {
        fn channel_type(&self) -> &'static str {
            "counting"
        }

        async fn send(&self, _event: &NotificationEvent) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(crate::Error::notification("boom"))
            } else {
                Ok(())
            }
        }
    }

    fn success_event() -> NotificationEvent {
        NotificationEvent::LoginSuccess {
            username: "alice".to_string(),
            message: "ok".to_string(),
        }
    }

    #[tokio::test]
    async fn disabled_settings_skip_the_channel() {
        let channel = Arc::new(CountingChannel {
            sent: AtomicUsize::new(0),
            fail: false,
        });
        let settings = NotificationSettings {
            enabled: false,
            ..Default::default()
        };
        let notifier = Notifier::with_channel(settings, channel.clone());

        assert!(!notifier.notify(&success_event()).await);
        assert_eq!(channel.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_delivery_reports_sent() {
        let channel = Arc::new(CountingChannel {
            sent: AtomicUsize::new(0),
            fail: false,
        });
        let notifier = Notifier::with_channel(NotificationSettings::default(), channel.clone());

        assert!(notifier.notify(&success_event()).await);
        assert_eq!(channel.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn channel_failure_falls_back_and_still_reports_sent() {
        let channel = Arc::new(CountingChannel {
            sent: AtomicUsize::new(0),
            fail: true,
        });
        let notifier = Notifier::with_channel(NotificationSettings::default(), channel.clone());

        // Failure degrades to the console print, which counts as delivered.
        assert!(notifier.notify(&success_event()).await);
        assert_eq!(channel.sent.load(Ordering::SeqCst), 1);
    }
}
