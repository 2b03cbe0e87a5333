//! Login attempt models.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// ISO-8601 timestamp at second precision. Lexicographic order matches
/// chronological order, which the retention pruning relies on.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Status sentinel for a transport timeout.
pub const STATUS_TIMEOUT: &str = "TIMEOUT";

/// Status sentinel for a network-layer failure.
pub const STATUS_NETWORK_ERROR: &str = "NETWORK_ERROR";

/// Session value recorded when no request was sent.
pub const SESSION_NONE: &str = "N/A";

/// Upper bound on the stored response message.
pub const MESSAGE_MAX_LEN: usize = 300;

/// Current UTC time in the attempt log's timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A persisted login attempt. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LoginAttemptRecord {
    pub id: i64,
    pub timestamp: String,
    pub username: String,
    /// Always the encrypted form, never plaintext.
    pub password: String,
    /// Session/nonce value sent with the request, or `N/A`.
    pub a: String,
    /// HTTP status code as text, or one of the status sentinels.
    pub response_status: String,
    pub response_message: String,
    pub notification_sent: i64,
}

impl LoginAttemptRecord {
    pub fn notification_was_sent(&self) -> bool {
        self.notification_sent != 0
    }
}

/// A login attempt about to be appended to the log.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub timestamp: String,
    pub username: String,
    pub password: String,
    pub a: String,
    pub response_status: String,
    pub response_message: String,
    pub notification_sent: bool,
}

impl NewLoginAttempt {
    /// Build an attempt stamped with the current time. The message is
    /// truncated to [`MESSAGE_MAX_LEN`] characters.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        a: impl Into<String>,
        response_status: impl Into<String>,
        response_message: &str,
        notification_sent: bool,
    ) -> Self {
        Self {
            timestamp: now_timestamp(),
            username: username.into(),
            password: password.into(),
            a: a.into(),
            response_status: response_status.into(),
            response_message: truncate_message(response_message),
            notification_sent,
        }
    }

    /// Override the timestamp. Intended for tests and backfills.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MESSAGE_MAX_LEN {
        message.to_string()
    } else {
        message.chars().take(MESSAGE_MAX_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_truncated() {
        let long = "x".repeat(500);
        let attempt = NewLoginAttempt::new("alice", "ENC[..]", "123", "200", &long, false);
        assert_eq!(attempt.response_message.len(), MESSAGE_MAX_LEN);
    }

    #[test]
    fn short_message_is_kept() {
        let attempt = NewLoginAttempt::new("alice", "ENC[..]", "123", "200", "ok", true);
        assert_eq!(attempt.response_message, "ok");
        assert!(attempt.notification_sent);
    }

    #[test]
    fn timestamp_has_second_precision() {
        let ts = now_timestamp();
        // 2024-01-01T00:00:00 is 19 characters.
        assert_eq!(ts.len(), 19);
        assert!(ts.contains('T'));
    }
}
