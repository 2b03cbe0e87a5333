//! Configuration document handling.
//!
//! The configuration is a JSON document merged over hardcoded defaults:
//! object-valued keys deep-merge, everything else overwrites. Loading also
//! upgrades any plaintext password to its encrypted form and persists the
//! upgrade back to disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::secrets::SecretStore;
use crate::{Error, Result};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Placeholder username marking an unconfigured installation.
pub const USERNAME_SENTINEL: &str = "YOUR_USERNAME";

/// Sentinel value in `payload_params` marking the session field as
/// generated per attempt.
pub const DYNAMIC_SENTINEL: &str = "dynamic";

/// Per-event notification toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub on_success: bool,
    pub on_failure: bool,
    pub on_network_error: bool,
    pub on_already_logged_in: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            on_success: true,
            on_failure: true,
            on_network_error: true,
            on_already_logged_in: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Captive portal login endpoint.
    pub wifi_url: String,
    pub username: String,
    /// Stored in encrypted form; decrypted just-in-time for the request.
    pub password: String,
    pub product_type: String,
    /// Template for the login POST body. `"a": "dynamic"` is replaced with
    /// an epoch-seconds session value at attempt time.
    pub payload_params: BTreeMap<String, String>,
    pub notifications: NotificationSettings,
    pub db_name: String,
    /// Total attempts per invocation, including the first.
    pub retry_attempts: u32,
    /// Seconds to sleep between attempts.
    pub retry_delay: u64,
    /// Skip the login POST when the connectivity probe reports online.
    pub skip_if_online: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut payload_params = BTreeMap::new();
        payload_params.insert("mode".to_string(), "191".to_string());
        payload_params.insert("a".to_string(), DYNAMIC_SENTINEL.to_string());
        payload_params.insert("producttype".to_string(), "0".to_string());

        Self {
            wifi_url: String::new(),
            username: USERNAME_SENTINEL.to_string(),
            password: String::new(),
            product_type: "0".to_string(),
            payload_params,
            notifications: NotificationSettings::default(),
            db_name: "wifi_log.db".to_string(),
            retry_attempts: 3,
            retry_delay: 5,
            skip_if_online: true,
        }
    }
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// Fails with [`Error::ConfigMissing`] when the file does not exist.
    /// A file that exists but doesn't parse is recovered by falling back to
    /// defaults with a warning. Plaintext passwords are encrypted via the
    /// secret store and the upgraded document is written back.
    pub fn load(path: &Path, secrets: &SecretStore) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path)?;
        let user_doc: Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed configuration; falling back to defaults");
                Value::Object(serde_json::Map::new())
            }
        };

        let mut merged = serde_json::to_value(Config::default())?;
        merge_values(&mut merged, user_doc);

        let mut config: Config = match serde_json::from_value(merged) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Configuration has invalid field types; falling back to defaults");
                Config::default()
            }
        };

        if !config.password.is_empty() {
            let encrypted = secrets.encrypt_if_plaintext(&config.password)?;
            if encrypted != config.password {
                config.password = encrypted;
                config.save(path)?;
                info!(path = %path.display(), "Encrypted plaintext password in configuration");
            }
        }

        Ok(config)
    }

    /// Persist the configuration as pretty-printed JSON.
    ///
    /// Re-saving an unchanged configuration is a byte-wise no-op.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = serde_json::to_string_pretty(self)?;
        if let Ok(existing) = fs::read_to_string(path)
            && existing == rendered
        {
            return Ok(());
        }
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Whether first-run setup has been completed.
    pub fn is_configured(&self) -> bool {
        self.username != USERNAME_SENTINEL && !self.wifi_url.is_empty()
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key-by-key; any other value type overwrites.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretStore;
    use serde_json::json;

    fn secrets() -> SecretStore {
        SecretStore::from_key([0x42; 32])
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.username, USERNAME_SENTINEL);
        assert_eq!(config.product_type, "0");
        assert_eq!(config.db_name, "wifi_log.db");
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay, 5);
        assert_eq!(config.payload_params.get("a").unwrap(), DYNAMIC_SENTINEL);
        assert!(config.notifications.enabled);
        assert!(!config.is_configured());
    }

    #[test]
    fn merge_deep_merges_objects_and_overwrites_scalars() {
        let mut base = json!({
            "retry_attempts": 3,
            "notifications": {"enabled": true, "on_success": true},
            "payload_params": {"mode": "191", "a": "dynamic"}
        });
        let overlay = json!({
            "retry_attempts": 7,
            "notifications": {"on_success": false},
            "payload_params": {"a": "12345"}
        });
        merge_values(&mut base, overlay);

        assert_eq!(base["retry_attempts"], 7);
        assert_eq!(base["notifications"]["enabled"], true);
        assert_eq!(base["notifications"]["on_success"], false);
        assert_eq!(base["payload_params"]["mode"], "191");
        assert_eq!(base["payload_params"]["a"], "12345");
    }

    #[test]
    fn missing_file_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let err = Config::load(&path, &secrets()).unwrap_err();
        assert!(matches!(err, Error::ConfigMissing { .. }));
        assert!(err.to_string().contains("config.example.json"));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let config = Config::load(&path, &secrets()).unwrap();
        assert_eq!(config.username, USERNAME_SENTINEL);
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"wifi_url": "http://portal.example/login", "username": "alice"}"#,
        )
        .unwrap();

        let config = Config::load(&path, &secrets()).unwrap();
        assert_eq!(config.wifi_url, "http://portal.example/login");
        assert_eq!(config.username, "alice");
        assert_eq!(config.retry_attempts, 3);
        assert!(config.is_configured());
    }

    #[test]
    fn plaintext_password_is_upgraded_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"wifi_url": "http://portal.example/login", "username": "alice", "password": "secret123"}"#,
        )
        .unwrap();

        let store = secrets();
        let config = Config::load(&path, &store).unwrap();
        assert_ne!(config.password, "secret123");
        assert_eq!(store.decrypt_if_encrypted(&config.password), "secret123");

        // The upgrade was written back.
        let persisted: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_ne!(persisted["password"], "secret123");
        assert_eq!(
            store.decrypt_if_encrypted(persisted["password"].as_str().unwrap()),
            "secret123"
        );

        // A second load leaves the ciphertext untouched.
        let reloaded = Config::load(&path, &store).unwrap();
        assert_eq!(reloaded.password, config.password);
    }

    #[test]
    fn save_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::default();
        config.save(&path).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        config.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }
}
