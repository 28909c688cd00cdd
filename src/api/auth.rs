//! Login, registration and logout endpoints

use reqwest::Method;
use secrecy::ExposeSecret;

use crate::api::client::FitnessClient;
use crate::api::models::CredentialsBody;
use crate::core::credentials::Credentials;
use crate::error::Result;

/// Handler for account authentication
pub struct AuthHandler<'a> {
    client: &'a FitnessClient,
}

impl<'a> AuthHandler<'a> {
    /// Create a new auth handler
    pub fn new(client: &'a FitnessClient) -> Self {
        Self { client }
    }

    /// Log in, establishing the cookie session
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let body = CredentialsBody {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        };
        let request = self.client.request(Method::POST, "login").json(&body);

        self.client
            .send_for_status(request, "Logged in successfully", "Invalid credentials")
            .await
    }

    /// Create an account
    ///
    /// Does not log in; the session layer does that on success.
    pub async fn register(&self, credentials: &Credentials) -> Result<String> {
        let body = CredentialsBody {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        };
        let request = self.client.request(Method::POST, "register").json(&body);

        self.client
            .send_for_status(request, "Registered successfully", "Registration failed")
            .await
    }

    /// End the cookie session
    pub async fn logout(&self) -> Result<String> {
        let request = self.client.request(Method::POST, "logout");

        self.client
            .send_for_status(request, "Logged out successfully", "Failed to log out")
            .await
    }
}
