//! Notification events.

use crate::config::NotificationSettings;

/// Delivery urgency, mapped to the desktop channel's urgency levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Critical => "critical",
        }
    }
}

/// An outcome worth telling the operator about.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    LoginSuccess { username: String, message: String },
    AlreadyOnline { username: String, message: String },
    LoginFailed { username: String, message: String },
    NetworkError { username: String, message: String },
    Test,
}

impl NotificationEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::LoginSuccess { .. } => "login_success",
            Self::AlreadyOnline { .. } => "already_online",
            Self::LoginFailed { .. } => "login_failed",
            Self::NetworkError { .. } => "network_error",
            Self::Test => "test",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LoginSuccess { .. } => "WiFi Login Successful",
            Self::AlreadyOnline { .. } => "Already Connected",
            Self::LoginFailed { .. } => "WiFi Login Failed",
            Self::NetworkError { .. } => "WiFi Network Error",
            Self::Test => "WiFi Sentry",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::LoginSuccess { username, message } => {
                format!("Logged in as {username}: {message}")
            }
            Self::AlreadyOnline { username, message } => {
                format!("{username} is already online: {message}")
            }
            Self::LoginFailed { username, message } => {
                format!("Login failed for {username}: {message}")
            }
            Self::NetworkError { username, message } => {
                format!("Could not reach the portal for {username}: {message}")
            }
            Self::Test => "Test notification. If you can read this, delivery works.".to_string(),
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            Self::LoginSuccess { .. } | Self::AlreadyOnline { .. } | Self::Test => Urgency::Normal,
            Self::LoginFailed { .. } | Self::NetworkError { .. } => Urgency::Critical,
        }
    }

    /// Whether this event is enabled under the given settings. The master
    /// switch gates everything; each category has its own toggle.
    pub fn is_enabled(&self, settings: &NotificationSettings) -> bool {
        if !settings.enabled {
            return false;
        }
        match self {
            Self::LoginSuccess { .. } => settings.on_success,
            Self::AlreadyOnline { .. } => settings.on_already_logged_in,
            Self::LoginFailed { .. } => settings.on_failure,
            Self::NetworkError { .. } => settings.on_network_error,
            Self::Test => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str) -> NotificationEvent {
        let username = "alice".to_string();
        let message = "msg".to_string();
        match kind {
            "success" => NotificationEvent::LoginSuccess { username, message },
            "already" => NotificationEvent::AlreadyOnline { username, message },
            "failed" => NotificationEvent::LoginFailed { username, message },
            _ => NotificationEvent::NetworkError { username, message },
        }
    }

    #[test]
    fn master_switch_gates_everything() {
        let settings = NotificationSettings {
            enabled: false,
            ..Default::default()
        };
        for kind in ["success", "already", "failed", "network"] {
            assert!(!event(kind).is_enabled(&settings));
        }
        assert!(!NotificationEvent::Test.is_enabled(&settings));
    }

    #[test]
    fn per_event_toggles_are_independent() {
        let settings = NotificationSettings {
            enabled: true,
            on_success: false,
            ..Default::default()
        };
        assert!(!event("success").is_enabled(&settings));
        assert!(event("failed").is_enabled(&settings));
        assert!(event("already").is_enabled(&settings));
    }

    #[test]
    fn failures_are_critical() {
        assert_eq!(event("failed").urgency(), Urgency::Critical);
        assert_eq!(event("network").urgency(), Urgency::Critical);
        assert_eq!(event("success").urgency(), Urgency::Normal);
    }
}
