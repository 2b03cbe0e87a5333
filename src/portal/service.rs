//! Login orchestration.
//!
//! One attempt runs: connectivity pre-check → payload build → POST →
//! classification → attempt log → notification. The retry loop wraps whole
//! attempts. HTTP status 200 is authoritative for the boolean result;
//! message classification only drives notification content.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::classifier::{Outcome, classify, extract_message};
use super::transport::{LoginTransport, TransportError};
use crate::config::{Config, DYNAMIC_SENTINEL};
use crate::database::models::{
    NewLoginAttempt, STATUS_NETWORK_ERROR, STATUS_TIMEOUT, now_timestamp,
};
use crate::database::repositories::AttemptRepository;
use crate::notification::{NotificationEvent, Notifier};
use crate::probe::ConnectivityProbe;
use crate::secrets::SecretStore;

/// Drives login attempts end to end.
pub struct LoginService {
    config: Config,
    secrets: SecretStore,
    repository: AttemptRepository,
    notifier: Notifier,
    transport: Arc<dyn LoginTransport>,
    probe: ConnectivityProbe,
}

impl LoginService {
    pub fn new(
        config: Config,
        secrets: SecretStore,
        repository: AttemptRepository,
        notifier: Notifier,
        transport: Arc<dyn LoginTransport>,
    ) -> Self {
        Self {
            config,
            secrets,
            repository,
            notifier,
            transport,
            probe: ConnectivityProbe::default(),
        }
    }

    /// Run attempts until one succeeds, up to `retry_attempts` total
    /// (including the first), sleeping `retry_delay` seconds in between.
    pub async fn run_with_retries(&self) -> bool {
        let total = self.config.retry_attempts.max(1);

        for attempt in 1..=total {
            if self.attempt_login().await {
                return true;
            }
            if attempt < total {
                info!(
                    attempt,
                    total,
                    delay_secs = self.config.retry_delay,
                    "Login attempt failed; retrying"
                );
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay)).await;
            }
        }

        warn!(attempts = total, "All login attempts failed");
        false
    }

    /// Perform one login attempt. Returns `true` only when the portal
    /// answered with HTTP 200 (or when the attempt was skipped because the
    /// device is already online).
    pub async fn attempt_login(&self) -> bool {
        if self.config.skip_if_online && self.probe.is_online().await {
            info!("Connectivity probe reports online; skipping login attempt");
            println!("✅ Already connected; no login attempt needed.");
            return true;
        }

        let (payload, session) = self.build_payload();
        debug!(url = %self.config.wifi_url, session = %session, "Sending login request");

        let response = match self.transport.post_login(&self.config.wifi_url, &payload).await {
            Ok(response) => response,
            Err(error @ TransportError::Timeout) => {
                let message = error.to_string();
                self.handle_transport_failure(Outcome::Timeout, STATUS_TIMEOUT, &message, &session)
                    .await;
                return false;
            }
            Err(TransportError::Network(detail)) => {
                self.handle_transport_failure(
                    Outcome::NetworkError,
                    STATUS_NETWORK_ERROR,
                    &detail,
                    &session,
                )
                .await;
                return false;
            }
        };

        let message = extract_message(&response.body);
        let outcome = classify(&message);
        self.print_summary(&session, &response.status.to_string(), &message);

        let event = self.outcome_event(outcome, &message);
        let notified = self.notifier.notify(&event).await;

        self.repository
            .record(&NewLoginAttempt::new(
                &self.config.username,
                &self.config.password,
                &session,
                response.status.to_string(),
                &message,
                notified,
            ))
            .await;

        response.status == 200
    }

    /// Build the POST body from the configured template.
    ///
    /// `username`/`password` always come from the credentials (password
    /// decrypted just-in-time); the `a` field is generated from the current
    /// time when the template holds the dynamic sentinel.
    fn build_payload(&self) -> (BTreeMap<String, String>, String) {
        let mut payload = self.config.payload_params.clone();

        let session = match payload.get("a") {
            Some(value) if value != DYNAMIC_SENTINEL => value.clone(),
            _ => Utc::now().timestamp().to_string(),
        };

        payload.insert("username".to_string(), self.config.username.clone());
        payload.insert(
            "password".to_string(),
            self.secrets.decrypt_if_encrypted(&self.config.password),
        );
        payload.insert("a".to_string(), session.clone());
        payload.insert("producttype".to_string(), self.config.product_type.clone());

        (payload, session)
    }

    async fn handle_transport_failure(
        &self,
        outcome: Outcome,
        status: &str,
        detail: &str,
        session: &str,
    ) {
        warn!(status, detail, "Login request failed before a response");
        self.print_summary(session, status, detail);

        let event = self.outcome_event(outcome, detail);
        let notified = self.notifier.notify(&event).await;

        self.repository
            .record(&NewLoginAttempt::new(
                &self.config.username,
                &self.config.password,
                session,
                status,
                detail,
                notified,
            ))
            .await;
    }

    fn outcome_event(&self, outcome: Outcome, message: &str) -> NotificationEvent {
        let username = self.config.username.clone();
        let message = message.to_string();
        match outcome {
            Outcome::Success => NotificationEvent::LoginSuccess { username, message },
            Outcome::AlreadyConnected => NotificationEvent::AlreadyOnline { username, message },
            Outcome::LoginFailed => NotificationEvent::LoginFailed { username, message },
            Outcome::NetworkError | Outcome::Timeout => {
                NotificationEvent::NetworkError { username, message }
            }
        }
    }

    fn print_summary(&self, session: &str, status: &str, message: &str) {
        println!("\n📌 Login Attempt");
        println!("Time: {}", now_timestamp());
        println!("Username: {}", self.config.username);
        println!("Session ID (a): {session}");
        println!("Status: {status}");
        println!("Message: {message}");
        println!("{}", "-".repeat(80));
    }
}
