//! Login request transport.
//!
//! The orchestrator talks to the portal through the [`LoginTransport`]
//! trait; tests substitute a scripted implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Bounded timeout for the login POST.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Network-layer failures, separated so the orchestrator can record the
/// matching status sentinel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {}s", LOGIN_TIMEOUT.as_secs())]
    Timeout,
    #[error("{0}")]
    Network(String),
}

/// Raw portal response, before classification.
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the orchestrator and the HTTP stack.
#[async_trait]
pub trait LoginTransport: Send + Sync {
    /// Send the login form to `url` and return the raw response.
    async fn post_login(
        &self,
        url: &str,
        form: &BTreeMap<String, String>,
    ) -> Result<PortalResponse, TransportError>;
}

/// Production transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOGIN_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LoginTransport for HttpTransport {
    async fn post_login(
        &self,
        url: &str,
        form: &BTreeMap<String, String>,
    ) -> Result<PortalResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(PortalResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}
