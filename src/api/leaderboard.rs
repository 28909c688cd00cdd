//! Leaderboard endpoint

use reqwest::Method;

use crate::api::client::FitnessClient;
use crate::api::models::LeaderboardEntry;
use crate::error::Result;

/// Handler for the public leaderboard
pub struct LeaderboardHandler<'a> {
    client: &'a FitnessClient,
}

impl<'a> LeaderboardHandler<'a> {
    pub fn new(client: &'a FitnessClient) -> Self {
        Self { client }
    }

    /// Fetch the leaderboard in the server's ranking order
    pub async fn fetch(&self) -> Result<Vec<LeaderboardEntry>> {
        let request = self.client.request(Method::GET, "leaderboards");
        self.client
            .send_json(request, "Failed to fetch leaderboard")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_keeps_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/leaderboards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"username": "zoe", "pushups": 10, "pullups": 2, "points": 50},
                {"username": "amy", "pushups": 40, "pullups": 9, "points": 30}
            ])))
            .mount(&server)
            .await;

        let client =
            FitnessClient::with_base_url(&format!("{}/api", server.uri()), Duration::from_secs(5))
                .unwrap();
        let entries = LeaderboardHandler::new(&client).fetch().await.unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, ["zoe", "amy"]);
        assert_eq!(entries[1].pullups, 9);
    }

    #[tokio::test]
    async fn test_error_object_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/leaderboards"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({"status": "error", "message": "db down"}),
            ))
            .mount(&server)
            .await;

        let client =
            FitnessClient::with_base_url(&format!("{}/api", server.uri()), Duration::from_secs(5))
                .unwrap();
        let err = LeaderboardHandler::new(&client).fetch().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch leaderboard (HTTP 500)"));
    }
}
