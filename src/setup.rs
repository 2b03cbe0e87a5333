//! Interactive first-run setup.

use std::io::{self, Write as _};
use std::path::Path;

use crate::config::Config;
use crate::secrets::SecretStore;
use crate::{Error, Result};

/// Guide the user through configuring the portal URL and credentials,
/// then write the configuration with the password already encrypted.
pub fn run_wizard(config_path: &Path, secrets: &SecretStore) -> Result<()> {
    println!("--- WiFi Sentry Interactive Setup ---");
    println!("This wizard will help you configure the client.\n");

    let wifi_url = prompt("1. Enter the POST request URL from your network's login page: ")?;
    let username = prompt("2. Enter your login username: ")?;
    let password = prompt("3. Enter your login password: ")?;

    if wifi_url.is_empty() || username.is_empty() {
        return Err(Error::config("URL and username must not be empty"));
    }

    let mut config = Config::default();
    config.wifi_url = wifi_url;
    config.username = username;
    config.password = secrets.encrypt_if_plaintext(&password)?;
    config.save(config_path)?;

    println!("\nSetup complete! Configuration written to {}.", config_path.display());
    println!("Run 'wifi-sentry --login' to perform a login attempt.");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
