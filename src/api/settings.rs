//! Account settings endpoint

use reqwest::Method;

use crate::api::client::FitnessClient;
use crate::api::models::SettingsUpdate;
use crate::error::Result;

/// Handler for account settings and deletion
pub struct SettingsHandler<'a> {
    client: &'a FitnessClient,
}

impl<'a> SettingsHandler<'a> {
    pub fn new(client: &'a FitnessClient) -> Self {
        Self { client }
    }

    /// Send an account update (rename, new password, or deletion)
    pub async fn update(&self, update: &SettingsUpdate) -> Result<String> {
        let request = self.client.request(Method::POST, "settings").json(update);
        self.client
            .send_for_status(
                request,
                "Settings updated successfully",
                "Failed to update settings",
            )
            .await
    }
}
