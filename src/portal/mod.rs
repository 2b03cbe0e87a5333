//! Captive portal login: response classification, transport, orchestration.

mod classifier;
mod service;
mod transport;

pub use classifier::{NO_RESPONSE_MESSAGE, Outcome, classify, extract_message};
pub use service::LoginService;
pub use transport::{HttpTransport, LOGIN_TIMEOUT, LoginTransport, PortalResponse, TransportError};
