//! Encryption at rest for stored credentials.
//!
//! Secrets in the configuration file and the attempt log are stored as
//! AES-256-GCM ciphertext wrapped in an `ENC[...]` marker. The marker makes
//! "is this already encrypted?" an explicit classification instead of a
//! decrypt-and-catch probe, while keeping the lenient passthrough behavior
//! for values that don't carry it.

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Default location of the symmetric key material.
pub const DEFAULT_KEY_PATH: &str = "config/secret.key";

/// Marker prefix for encrypted values.
const CIPHERTEXT_PREFIX: &str = "ENC[";

/// Marker suffix for encrypted values.
const CIPHERTEXT_SUFFIX: &str = "]";

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// Classification of a stored secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    /// The value carries the ciphertext marker and decodes to nonce + payload.
    Ciphertext(Vec<u8>),
    /// Anything else. Treated as a plaintext secret.
    Plaintext,
}

impl SecretValue {
    /// Classify a stored value without touching the cipher.
    pub fn classify(value: &str) -> Self {
        let Some(inner) = value
            .strip_prefix(CIPHERTEXT_PREFIX)
            .and_then(|rest| rest.strip_suffix(CIPHERTEXT_SUFFIX))
        else {
            return Self::Plaintext;
        };

        match BASE64.decode(inner) {
            Ok(raw) if raw.len() >= NONCE_LEN + TAG_LEN => Self::Ciphertext(raw),
            _ => Self::Plaintext,
        }
    }
}

/// Symmetric secret store backed by a key file.
///
/// The key is generated once on first use and reused on subsequent runs.
/// Losing the key file makes previously encrypted secrets unrecoverable.
#[derive(Clone)]
pub struct SecretStore {
    cipher: Aes256Gcm,
    key_path: PathBuf,
}

impl SecretStore {
    /// Open the store, generating and persisting a fresh key if none exists.
    pub fn open(key_path: &Path) -> Result<Self> {
        let key = load_or_create_key(key_path)?;
        Ok(Self {
            cipher: Aes256Gcm::new(&key),
            key_path: key_path.to_path_buf(),
        })
    }

    /// Build a store from raw key bytes. Intended for tests.
    pub fn from_key(key: [u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
            key_path: PathBuf::from(DEFAULT_KEY_PATH),
        }
    }

    /// Location of the key material backing this store.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Return the ciphertext form of `value`.
    ///
    /// Values that already classify as ciphertext are returned unchanged, so
    /// repeated calls are idempotent.
    pub fn encrypt_if_plaintext(&self, value: &str) -> Result<String> {
        if let SecretValue::Ciphertext(_) = SecretValue::classify(value) {
            return Ok(value.to_string());
        }

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, value.as_bytes())
            .map_err(|e| Error::secret(format!("encryption failed: {e}")))?;

        let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        Ok(format!(
            "{CIPHERTEXT_PREFIX}{}{CIPHERTEXT_SUFFIX}",
            BASE64.encode(raw)
        ))
    }

    /// Return the plaintext form of `value`.
    ///
    /// Values that don't classify as ciphertext are returned verbatim. A
    /// marked value that fails authentication is also passed through, with a
    /// warning: it was most likely produced under a key that no longer exists.
    pub fn decrypt_if_encrypted(&self, value: &str) -> String {
        let SecretValue::Ciphertext(raw) = SecretValue::classify(value) else {
            debug!("Value is not ciphertext; returning as-is");
            return value.to_string();
        };

        let (nonce_bytes, payload) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        match self.cipher.decrypt(nonce, payload) {
            Ok(plaintext) => match String::from_utf8(plaintext) {
                Ok(s) => s,
                Err(_) => {
                    warn!("Decrypted secret is not valid UTF-8; returning stored form");
                    value.to_string()
                }
            },
            Err(_) => {
                warn!("Failed to decrypt stored secret (wrong or lost key?); returning stored form");
                value.to_string()
            }
        }
    }
}

fn load_or_create_key(key_path: &Path) -> Result<Key<Aes256Gcm>> {
    if key_path.exists() {
        let encoded = fs::read_to_string(key_path)?;
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| Error::secret(format!("corrupt key file {}: {e}", key_path.display())))?;
        if raw.len() != 32 {
            return Err(Error::secret(format!(
                "key file {} holds {} bytes, expected 32",
                key_path.display(),
                raw.len()
            )));
        }
        return Ok(*Key::<Aes256Gcm>::from_slice(&raw));
    }

    let key = Aes256Gcm::generate_key(&mut OsRng);
    if let Some(parent) = key_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(key_path, BASE64.encode(key))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(key_path, fs::Permissions::from_mode(0o600));
    }

    info!(path = %key_path.display(), "Generated new secret key");
    Ok(key)
}
