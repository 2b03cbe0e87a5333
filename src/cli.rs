//! Command-line argument surface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

/// An automatic captive portal login client.
#[derive(Debug, Parser)]
#[command(name = "wifi-sentry", version, about)]
pub struct Args {
    /// Perform a login attempt.
    #[arg(long)]
    pub login: bool,

    /// View the last N login attempts.
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "5")]
    pub view_logs: Option<u32>,

    /// Run the interactive setup wizard to configure credentials.
    #[arg(long)]
    pub setup: bool,

    /// Test the connection to the login URL without logging in.
    #[arg(long)]
    pub test: bool,

    /// Clear the login history; with DAYS, only entries older than DAYS days.
    #[arg(long, value_name = "DAYS", num_args = 0..=1, default_missing_value = "0")]
    pub clear_logs: Option<u32>,

    /// Fire a test notification and exit.
    #[arg(long)]
    pub test_notify: bool,

    /// Suppress notifications for this run.
    #[arg(long)]
    pub no_notify: bool,

    /// Path to the configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory for log files; file logging is off when omitted.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// The single action an invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    ViewLogs(u32),
    Setup,
    Test,
    /// `None` clears everything; `Some(days)` prunes by age.
    ClearLogs(Option<u32>),
    TestNotify,
    /// No action flag: one login attempt, then show the latest record.
    Default,
}

impl Args {
    /// Resolve the action flags, first match wins.
    pub fn action(&self) -> Action {
        if self.setup {
            Action::Setup
        } else if self.test_notify {
            Action::TestNotify
        } else if self.login {
            Action::Login
        } else if let Some(limit) = self.view_logs {
            Action::ViewLogs(limit)
        } else if self.test {
            Action::Test
        } else if let Some(days) = self.clear_logs {
            Action::ClearLogs(if days == 0 { None } else { Some(days) })
        } else {
            Action::Default
        }
    }
}
