//! Transport error classification
//!
//! Turns reqwest failures into errors that tell the user what to check.

use url::Url;

use crate::error::PeakError;

/// Classifies a reqwest error into a more specific PeakError if possible
pub fn classify_transport_error(err: reqwest::Error, base_url: &str) -> PeakError {
    if err.is_timeout() {
        tracing::warn!(error = %err, "Request timed out");
        return PeakError::Timeout;
    }

    if err.is_connect() {
        tracing::warn!(error = %err, "Connection failed");
        return PeakError::Unreachable(server_label(base_url));
    }

    PeakError::Network(err)
}

/// Host (and port, if any) of the server for error messages
///
/// Falls back to the raw address when it does not parse.
pub fn server_label(base_url: &str) -> String {
    Url::parse(base_url)
        .ok()
        .and_then(|url| {
            url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
        .unwrap_or_else(|| base_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_label_uses_host() {
        assert_eq!(
            server_label("https://www.peak-fitness.live/api"),
            "www.peak-fitness.live"
        );
    }

    #[test]
    fn test_server_label_keeps_port() {
        assert_eq!(server_label("http://127.0.0.1:8080/api"), "127.0.0.1:8080");
    }

    #[test]
    fn test_server_label_falls_back_to_raw() {
        assert_eq!(server_label("garbage"), "garbage");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Nothing listens on the discard port
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/api/pushups")
            .send()
            .await
            .unwrap_err();

        let classified = classify_transport_error(err, "http://127.0.0.1:9/api");
        assert!(matches!(classified, PeakError::Unreachable(ref host) if host == "127.0.0.1:9"));
    }
}
