//! wifi-sentry library crate.
//!
//! This module exposes the core functionality for integration testing.

pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod notification;
pub mod portal;
pub mod probe;
pub mod secrets;
pub mod setup;

pub use error::{Error, Result};
