//! Operator notifications.
//!
//! Outcomes are delivered through a single channel selected at startup:
//! desktop notifications where available, console output otherwise.
//! Delivery is strictly best-effort and never fails the caller.

pub mod channels;
mod events;
mod service;

pub use events::{NotificationEvent, Urgency};
pub use service::Notifier;
