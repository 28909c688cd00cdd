//! Registration form validation
//!
//! Checked before anything is sent to the server. The first failing rule
//! wins; the server still applies its own policy afterwards.

use crate::error::{PeakError, Result};

pub const MIN_USERNAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Values typed into the registration form
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Check the form, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.username.chars().count() < MIN_USERNAME_CHARS {
            return fail("Username must be at least 2 characters long");
        }

        let password = &self.password;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return fail("Password must be at least 8 characters long");
        }
        if !password.chars().any(char::is_uppercase) {
            return fail("Password must contain at least one uppercase letter");
        }
        if !password.chars().any(char::is_lowercase) {
            return fail("Password must contain at least one lowercase letter");
        }
        if !password.chars().any(char::is_numeric) {
            return fail("Password must contain at least one number");
        }
        if *password != self.confirm_password {
            return fail("Passwords do not match");
        }

        Ok(())
    }
}

fn fail(message: &str) -> Result<()> {
    Err(PeakError::Validation(message.to_string()))
}
