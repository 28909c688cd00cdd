//! Account session flows
//!
//! Ties the API handlers to the credential vault: a successful login is
//! remembered, a later start replays it, and logout or account deletion
//! forgets it.

use secrecy::{ExposeSecret, SecretString};

use crate::api::{AuthHandler, FitnessClient, SettingsHandler, SettingsUpdate};
use crate::core::config::Config;
use crate::core::credentials::{CredentialSource, CredentialVault, Credentials, KeyringVault};
use crate::core::validation::RegistrationForm;
use crate::error::{PeakError, Result};

/// Outcome of replaying stored credentials at start-up
#[derive(Debug)]
pub enum AutoLogin {
    /// The stored credentials were accepted
    Restored { username: String, message: String },
    /// Nothing stored; the user has to log in
    NoCredentials,
    /// Stored credentials exist but the login failed
    Failed(PeakError),
}

/// Logged-in state shared by the CLI and the TUI
///
/// Clones share the underlying cookie session.
#[derive(Debug, Clone)]
pub struct Session<V = KeyringVault> {
    api: FitnessClient,
    vault: V,
}

impl Session<KeyringVault> {
    /// Session against the configured server, remembering logins in the keyring
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_vault(FitnessClient::new(config)?, KeyringVault))
    }
}

impl<V: CredentialVault> Session<V> {
    pub fn with_vault(api: FitnessClient, vault: V) -> Self {
        Self { api, vault }
    }

    /// API client carrying this session's cookie
    pub fn api(&self) -> &FitnessClient {
        &self.api
    }

    /// Log in and remember the credentials
    ///
    /// Failing to save the credentials does not fail the login.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<String> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.clone(),
        };
        let message = AuthHandler::new(&self.api).login(&credentials).await?;
        tracing::info!(username, "Logged in");

        if let Err(e) = self.vault.save(&credentials) {
            tracing::warn!(error = %e, "Could not save credentials");
        }

        Ok(message)
    }

    /// Validate the form, create the account, then log in with it
    ///
    /// Returns the login's message.
    pub async fn register(&self, form: &RegistrationForm) -> Result<String> {
        form.validate()?;

        let credentials = Credentials::new(form.username.clone(), form.password.clone());
        AuthHandler::new(&self.api).register(&credentials).await?;
        tracing::info!(username = form.username.as_str(), "Registered");

        self.login(&credentials.username, &credentials.password)
            .await
    }

    /// Replay stored credentials
    ///
    /// Never saves or deletes credentials, whatever the outcome.
    pub async fn auto_login(&self) -> AutoLogin {
        let stored = match self.vault.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return AutoLogin::NoCredentials,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored credentials");
                return AutoLogin::Failed(e);
            }
        };

        let credentials = stored.credentials;
        match AuthHandler::new(&self.api).login(&credentials).await {
            Ok(message) => {
                tracing::info!(username = credentials.username.as_str(), "Session restored");
                AutoLogin::Restored {
                    username: credentials.username,
                    message,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Automatic login failed");
                AutoLogin::Failed(e)
            }
        }
    }

    /// Re-establish the session before an authenticated command
    pub async fn resume(&self) -> Result<String> {
        match self.auto_login().await {
            AutoLogin::Restored { username, .. } => Ok(username),
            AutoLogin::NoCredentials => Err(PeakError::NotAuthenticated),
            AutoLogin::Failed(e) => Err(e),
        }
    }

    /// Log out on the server, then forget the stored credentials
    pub async fn logout(&self) -> Result<String> {
        let message = AuthHandler::new(&self.api).logout().await?;
        self.forget_credentials();
        Ok(message)
    }

    /// Change username and/or password
    ///
    /// Stored keyring credentials follow the change so the next start can
    /// still log in.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<String> {
        if update.is_empty() {
            return Err(PeakError::InvalidInput("Nothing to update".to_string()));
        }

        let message = SettingsHandler::new(&self.api).update(&update).await?;
        self.remember_update(&update);
        Ok(message)
    }

    /// Delete the account, then forget the stored credentials
    pub async fn delete_account(&self) -> Result<String> {
        let message = SettingsHandler::new(&self.api)
            .update(&SettingsUpdate::delete_account())
            .await?;
        tracing::info!("Account deleted");
        self.forget_credentials();
        Ok(message)
    }

    fn forget_credentials(&self) {
        if let Err(e) = self.vault.clear() {
            tracing::warn!(error = %e, "Could not clear stored credentials");
        }
    }

    fn remember_update(&self, update: &SettingsUpdate) {
        let stored = match self.vault.load() {
            Ok(Some(stored)) if stored.source == CredentialSource::Keyring => stored,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored credentials");
                return;
            }
        };

        let current = stored.credentials;
        let updated = Credentials {
            username: update
                .new_username
                .clone()
                .unwrap_or(current.username),
            password: match &update.new_password {
                Some(password) => SecretString::from(password.clone()),
                None => SecretString::from(current.password.expose_secret().to_string()),
            },
        };

        if let Err(e) = self.vault.save(&updated) {
            tracing::warn!(error = %e, "Could not update stored credentials");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::{MockCredentialVault, StoredCredentials};
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stored(username: &str, password: &str, source: CredentialSource) -> StoredCredentials {
        StoredCredentials {
            credentials: Credentials::new(username, password),
            source,
        }
    }

    async fn session_with(vault: MockCredentialVault) -> (MockServer, Session<MockCredentialVault>) {
        let server = MockServer::start().await;
        let api =
            FitnessClient::with_base_url(&format!("{}/api", server.uri()), Duration::from_secs(5))
                .unwrap();
        (server, Session::with_vault(api, vault))
    }

    fn success() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"}))
    }

    fn failure(message: &str) -> ResponseTemplate {
        ResponseTemplate::new(401)
            .set_body_json(serde_json::json!({"status": "error", "message": message}))
    }

    #[tokio::test]
    async fn test_login_saves_credentials() {
        let mut vault = MockCredentialVault::new();
        vault
            .expect_save()
            .withf(|c| c.username == "alex" && c.password.expose_secret() == "Secret123")
            .times(1)
            .returning(|_| Ok(()));

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(success())
            .mount(&server)
            .await;

        let message = session
            .login("alex", &SecretString::from("Secret123"))
            .await
            .unwrap();
        assert_eq!(message, "Logged in successfully");
    }

    #[tokio::test]
    async fn test_login_survives_vault_failure() {
        let mut vault = MockCredentialVault::new();
        vault
            .expect_save()
            .returning(|_| Err(PeakError::Credential("locked".to_string())));

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(success())
            .mount(&server)
            .await;

        assert!(session
            .login("alex", &SecretString::from("Secret123"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_failed_login_saves_nothing() {
        let mut vault = MockCredentialVault::new();
        vault.expect_save().never();

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(failure("Wrong password"))
            .mount(&server)
            .await;

        let err = session
            .login("alex", &SecretString::from("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Wrong password");
    }

    #[tokio::test]
    async fn test_register_validates_before_network() {
        let (server, session) = session_with(MockCredentialVault::new()).await;

        let form = RegistrationForm::new("alex", "short", "short");
        let err = session.register(&form).await.unwrap_err();
        assert!(matches!(err, PeakError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_then_logs_in() {
        let mut vault = MockCredentialVault::new();
        vault.expect_save().times(1).returning(|_| Ok(()));

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/register"))
            .respond_with(success())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"status": "success", "message": "Welcome, alex"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let form = RegistrationForm::new("alex", "Secret123", "Secret123");
        assert_eq!(session.register(&form).await.unwrap(), "Welcome, alex");
    }

    #[tokio::test]
    async fn test_auto_login_without_credentials() {
        let mut vault = MockCredentialVault::new();
        vault.expect_load().returning(|| Ok(None));

        let (server, session) = session_with(vault).await;
        assert!(matches!(session.auto_login().await, AutoLogin::NoCredentials));
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(matches!(
            session.resume().await,
            Err(PeakError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_auto_login_restores_without_saving() {
        let mut vault = MockCredentialVault::new();
        vault
            .expect_load()
            .returning(|| Ok(Some(stored("alex", "Secret123", CredentialSource::Keyring))));
        vault.expect_save().never();

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(
                serde_json::json!({"username": "alex", "password": "Secret123"}),
            ))
            .respond_with(success())
            .mount(&server)
            .await;

        match session.auto_login().await {
            AutoLogin::Restored { username, message } => {
                assert_eq!(username, "alex");
                assert_eq!(message, "Logged in successfully");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auto_login_failure_keeps_credentials() {
        let mut vault = MockCredentialVault::new();
        vault
            .expect_load()
            .returning(|| Ok(Some(stored("alex", "Old12345", CredentialSource::Keyring))));
        vault.expect_clear().never();
        vault.expect_save().never();

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(failure("Invalid credentials"))
            .mount(&server)
            .await;

        assert!(matches!(session.auto_login().await, AutoLogin::Failed(_)));
    }

    #[tokio::test]
    async fn test_logout_clears_only_on_success() {
        let mut vault = MockCredentialVault::new();
        vault.expect_clear().times(1).returning(|| Ok(()));

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({"status": "error", "message": "Try again"}),
            ))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(success())
            .mount(&server)
            .await;

        assert!(session.logout().await.is_err());
        assert_eq!(session.logout().await.unwrap(), "Logged out successfully");
    }

    #[tokio::test]
    async fn test_empty_settings_update_is_rejected() {
        let (server, session) = session_with(MockCredentialVault::new()).await;

        let err = session
            .update_settings(SettingsUpdate::from_fields(" ", ""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Nothing to update");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_update_refreshes_stored_username() {
        let mut vault = MockCredentialVault::new();
        vault
            .expect_load()
            .returning(|| Ok(Some(stored("alex", "Secret123", CredentialSource::Keyring))));
        vault
            .expect_save()
            .withf(|c| c.username == "alexa" && c.password.expose_secret() == "Secret123")
            .times(1)
            .returning(|_| Ok(()));

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/settings"))
            .and(body_json(
                serde_json::json!({"new_username": "alexa", "delete_account": false}),
            ))
            .respond_with(success())
            .mount(&server)
            .await;

        let message = session
            .update_settings(SettingsUpdate::from_fields("alexa", ""))
            .await
            .unwrap();
        assert_eq!(message, "Settings updated successfully");
    }

    #[tokio::test]
    async fn test_settings_update_leaves_env_credentials_alone() {
        let mut vault = MockCredentialVault::new();
        vault
            .expect_load()
            .returning(|| Ok(Some(stored("ci", "Secret123", CredentialSource::Environment))));
        vault.expect_save().never();

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/settings"))
            .respond_with(success())
            .mount(&server)
            .await;

        assert!(session
            .update_settings(SettingsUpdate::from_fields("", "NewPass123"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_account_clears_credentials() {
        let mut vault = MockCredentialVault::new();
        vault.expect_clear().times(1).returning(|| Ok(()));

        let (server, session) = session_with(vault).await;
        Mock::given(method("POST"))
            .and(path("/api/settings"))
            .and(body_json(serde_json::json!({"delete_account": true})))
            .respond_with(success())
            .expect(1)
            .mount(&server)
            .await;

        assert!(session.delete_account().await.is_ok());
    }
}
