//! Secure credential storage using the system keyring
//!
//! Stores the username and password of the last successful login so the
//! next start can sign in again without prompting.
//!
//! Uses the system keyring (macOS Keychain, Linux Secret Service) with
//! in-memory caching to minimize keychain prompts.
//!
//! ## Environment Variable Fallback
//!
//! For development and CI, you can set credentials via environment variables:
//! - `PEAK_FITNESS_USERNAME`
//! - `PEAK_FITNESS_PASSWORD`
//!
//! Both must be set. Priority: env var > cache > keyring. Credentials read
//! from the environment are never written back to the keyring.

use std::sync::RwLock;

use keyring::Entry;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{PeakError, Result};

const SERVICE_NAME: &str = "peak-fitness";
const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";

// Environment variable names
pub const USERNAME_ENV: &str = "PEAK_FITNESS_USERNAME";
pub const PASSWORD_ENV: &str = "PEAK_FITNESS_PASSWORD";

// In-memory credential cache
// Option<Option<T>>:
//   - None = not yet fetched from keyring
//   - Some(None) = fetched, but no credential exists
//   - Some(Some(value)) = fetched and cached
static CREDENTIALS_CACHE: Lazy<RwLock<Option<Option<Credentials>>>> =
    Lazy::new(|| RwLock::new(None));

/// Username and password for the Peak Fitness account
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Where a set of credentials was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keyring,
}

/// Credentials together with their origin
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub credentials: Credentials,
    pub source: CredentialSource,
}

/// Credential store backed by the system keyring
pub struct CredentialStore;

impl CredentialStore {
    /// Store credentials securely
    ///
    /// Updates both the keyring and the in-memory cache.
    pub fn store(credentials: &Credentials) -> Result<()> {
        Entry::new(SERVICE_NAME, USERNAME_KEY)?.set_password(&credentials.username)?;
        Entry::new(SERVICE_NAME, PASSWORD_KEY)?
            .set_password(credentials.password.expose_secret())?;

        // Update cache immediately
        if let Ok(mut cache) = CREDENTIALS_CACHE.write() {
            *cache = Some(Some(credentials.clone()));
        }

        Ok(())
    }

    /// Retrieve stored credentials
    ///
    /// Priority: environment variables > cache > keyring
    pub fn get() -> Result<Option<StoredCredentials>> {
        Self::get_with_env(|key| std::env::var(key).ok())
    }

    /// `get` with the environment read through `env`
    fn get_with_env(env: impl Fn(&str) -> Option<String>) -> Result<Option<StoredCredentials>> {
        // Priority 1: Check environment variables
        if let Some(credentials) = Self::from_env(env) {
            return Ok(Some(StoredCredentials {
                credentials,
                source: CredentialSource::Environment,
            }));
        }

        let keyring_value = |credentials: Option<Credentials>| {
            credentials.map(|credentials| StoredCredentials {
                credentials,
                source: CredentialSource::Keyring,
            })
        };

        // Priority 2: Check cache
        if let Ok(cache) = CREDENTIALS_CACHE.read() {
            if let Some(cached_value) = cache.as_ref() {
                return Ok(keyring_value(cached_value.clone()));
            }
        }

        // Priority 3: Fetch from keyring and cache
        let result = Self::fetch_from_keyring()?;

        if let Ok(mut cache) = CREDENTIALS_CACHE.write() {
            *cache = Some(result.clone());
        }

        Ok(keyring_value(result))
    }

    /// Read credentials from the environment if both variables are set
    fn from_env(env: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
        let username = env(USERNAME_ENV)?;
        let password = env(PASSWORD_ENV)?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        tracing::debug!("Using credentials from environment");
        Some(Credentials::new(username, password))
    }

    /// Fetch credentials directly from keyring (no cache)
    ///
    /// A missing username or password counts as no credentials.
    fn fetch_from_keyring() -> Result<Option<Credentials>> {
        let Some(username) = Self::read_entry(USERNAME_KEY)? else {
            return Ok(None);
        };
        let Some(password) = Self::read_entry(PASSWORD_KEY)? else {
            return Ok(None);
        };
        Ok(Some(Credentials::new(username, password)))
    }

    fn read_entry(key: &str) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(PeakError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    /// Delete stored credentials
    ///
    /// Clears both the keyring and the in-memory cache.
    pub fn delete() -> Result<()> {
        let mut result = Ok(());
        for key in [USERNAME_KEY, PASSWORD_KEY] {
            let entry = Entry::new(SERVICE_NAME, key)?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => result = Err(PeakError::Credential(e.to_string())),
            }
        }

        // Clear cache immediately
        if let Ok(mut cache) = CREDENTIALS_CACHE.write() {
            *cache = Some(None);
        }

        result
    }

    /// Check if credentials are available
    pub fn has_credentials() -> Result<bool> {
        Ok(Self::get()?.is_some())
    }

    /// Get a masked version of a password for display
    ///
    /// Never reveals the length.
    pub fn mask_password(_password: &SecretString) -> String {
        "********".to_string()
    }
}

/// Persistence seam for the session's credentials
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVault: Send + Sync {
    /// Load saved credentials, if any
    fn load(&self) -> Result<Option<StoredCredentials>>;
    /// Save credentials after a successful login
    fn save(&self, credentials: &Credentials) -> Result<()>;
    /// Forget saved credentials
    fn clear(&self) -> Result<()>;
}

/// `CredentialVault` backed by [`CredentialStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringVault;

impl CredentialVault for KeyringVault {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        CredentialStore::get()
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        CredentialStore::store(credentials)
    }

    fn clear(&self) -> Result<()> {
        CredentialStore::delete()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_mask_password_hides_length() {
        let short = SecretString::from("abc");
        let long = SecretString::from("Sup3rSecretPassw0rd");
        assert_eq!(CredentialStore::mask_password(&short), "********");
        assert_eq!(
            CredentialStore::mask_password(&short),
            CredentialStore::mask_password(&long)
        );
    }

    fn fake_env(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| vars.get(key).map(|value| value.to_string())
    }

    #[test]
    fn test_env_credentials_take_priority() {
        // Env path returns before the keyring is touched
        let env = fake_env(&[(USERNAME_ENV, "env-user"), (PASSWORD_ENV, "Passw0rd!")]);

        let stored = CredentialStore::get_with_env(env).unwrap().unwrap();
        assert_eq!(stored.source, CredentialSource::Environment);
        assert_eq!(stored.credentials.username, "env-user");
        assert_eq!(stored.credentials.password.expose_secret(), "Passw0rd!");
    }

    #[test]
    fn test_env_credentials_need_both_values() {
        let only_user = fake_env(&[(USERNAME_ENV, "env-user")]);
        assert!(CredentialStore::from_env(only_user).is_none());

        let blank_password = fake_env(&[(USERNAME_ENV, "env-user"), (PASSWORD_ENV, "")]);
        assert!(CredentialStore::from_env(blank_password).is_none());
    }
}
