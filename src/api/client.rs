//! Peak Fitness API client wrapper using reqwest

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::error_handler::classify_transport_error;
use crate::api::models::{CountResponse, StatusResponse};
use crate::core::config::{validate_api_url, Config};
use crate::error::{PeakError, Result};

/// Peak Fitness API client
///
/// The server identifies the logged-in user by a session cookie, so the
/// underlying reqwest client keeps a cookie store. Clones share it.
#[derive(Debug, Clone)]
pub struct FitnessClient {
    http: Client,
    base_url: String,
}

impl FitnessClient {
    /// Create a client from the application configuration
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.effective_api_url(), config.request_timeout())
    }

    /// Create a client for an explicit server address
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = validate_api_url(base_url)?;
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(concat!("peak-fitness/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Server address requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request for an endpoint below the base URL
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!(method = method.as_str(), url = url.as_str(), "API request");
        self.http.request(method, url)
    }

    /// Send a request and decode its JSON body
    ///
    /// The body is decoded whatever the HTTP status; the server reports
    /// failures inside the JSON. `failure` names the operation in errors.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        failure: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(e, &self.base_url))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, &self.base_url))?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Undecodable API response");
            PeakError::InvalidResponse {
                message: failure.to_string(),
                status: status.as_u16(),
            }
        })
    }

    /// Send a request answered by a status response
    ///
    /// Returns the server's message, or `success` when it sent none.
    pub(crate) async fn send_for_status(
        &self,
        request: RequestBuilder,
        success: &str,
        failure: &str,
    ) -> Result<String> {
        let response: StatusResponse = self.send_json(request, failure).await?;

        if response.is_success() {
            Ok(response.message.unwrap_or_else(|| success.to_string()))
        } else {
            Err(PeakError::Rejected(
                response.message.unwrap_or_else(|| failure.to_string()),
            ))
        }
    }

    /// Send a request answered by `{"count": n}`
    pub(crate) async fn send_for_count(&self, request: RequestBuilder, failure: &str) -> Result<i64> {
        let response: CountResponse = self.send_json(request, failure).await?;
        response
            .count
            .ok_or_else(|| PeakError::Rejected(failure.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FitnessClient {
        FitnessClient::with_base_url(&format!("{}/api", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(FitnessClient::with_base_url("nope", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            FitnessClient::with_base_url("http://localhost:1/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/api");
    }

    #[tokio::test]
    async fn test_status_uses_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let message = client
            .send_for_status(client.request(Method::POST, "logout"), "Done", "Failed")
            .await
            .unwrap();
        assert_eq!(message, "Done");
    }

    #[tokio::test]
    async fn test_error_status_body_is_still_read() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                serde_json::json!({"status": "error", "message": "Wrong password"}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .send_for_status(client.request(Method::POST, "login"), "ok", "Invalid credentials")
            .await
            .unwrap_err();
        assert!(matches!(err, PeakError::Rejected(ref m) if m == "Wrong password"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pushups"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .send_for_count(client.request(Method::GET, "pushups"), "Failed to fetch count")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PeakError::InvalidResponse { ref message, status: 502 } if message == "Failed to fetch count"
        ));
    }

    #[tokio::test]
    async fn test_missing_count_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pullups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .send_for_count(client.request(Method::GET, "pullups"), "Failed to fetch count")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch count");
    }
}
