//! Custom error types for peak-fitness
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the peak-fitness application
#[derive(Error, Debug)]
pub enum PeakError {
    /// No stored credentials to resume a session with
    #[error("You are not logged in to Peak Fitness.\n\n  → Run 'peak auth login' to sign in, or 'peak auth register' to create an account.")]
    NotAuthenticated,

    /// The server answered but refused the request
    #[error("{0}")]
    Rejected(String),

    /// Registration form failed local validation
    #[error("{0}")]
    Validation(String),

    /// The server answered with something we could not decode
    #[error("{message} (HTTP {status})\n\n  → The server sent an unexpected response. Check 'peak config get api-url'.")]
    InvalidResponse { message: String, status: u16 },

    /// The request did not complete within the configured timeout
    #[error("The Peak Fitness server did not respond in time.\n\n  → Check your internet connection or raise it with 'peak config set request-timeout <secs>'.")]
    Timeout,

    /// Could not connect to the server at all
    #[error("Cannot reach the Peak Fitness server at {0}.\n\n  → Check your internet connection.\n  → Check the server address with 'peak config get api-url'.")]
    Unreachable(String),

    /// Custom exercise id not present in the user's list
    #[error("Custom exercise #{0} does not exist.\n\n  → Run 'peak custom list' to see your exercises.")]
    ExerciseNotFound(i64),

    /// Credential storage error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running.")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Terminal/TUI error
    #[error("Terminal error: {0}\n\n  → Try resizing your terminal or restarting it.")]
    Terminal(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,
}

impl PeakError {
    /// Short, single-line form for popups and status bars
    ///
    /// Drops the `→` hint lines that only make sense on a terminal prompt.
    pub fn summary(&self) -> String {
        let full = self.to_string();
        full.split("\n\n")
            .next()
            .unwrap_or(full.as_str())
            .trim()
            .to_string()
    }
}

impl From<keyring::Error> for PeakError {
    fn from(err: keyring::Error) -> Self {
        PeakError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for PeakError {
    fn from(err: toml::de::Error) -> Self {
        PeakError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for PeakError {
    fn from(err: toml::ser::Error) -> Self {
        PeakError::Toml(err.to_string())
    }
}

/// Result type alias using PeakError
pub type Result<T> = std::result::Result<T, PeakError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_drops_hints() {
        let err = PeakError::NotAuthenticated;
        assert_eq!(err.summary(), "You are not logged in to Peak Fitness.");
    }

    #[test]
    fn test_summary_keeps_server_message() {
        let err = PeakError::Rejected("Username already taken".to_string());
        assert_eq!(err.summary(), "Username already taken");
    }
}
