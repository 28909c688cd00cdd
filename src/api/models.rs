//! Request and response bodies of the Peak Fitness API

use serde::{Deserialize, Serialize};

use crate::core::counter::ExerciseChange;

/// One row of the leaderboard, in the server's ranking order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub pushups: i64,
    pub pullups: i64,
    pub points: i64,
}

/// A user-defined exercise with its running count
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomExercise {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

/// Generic `{"status": ..., "message": ...}` reply
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// `{"count": n}` reply of the counter endpoints
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountResponse {
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeBody {
    pub change: ExerciseChange,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewExerciseBody<'a> {
    pub exercise_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExerciseChangeBody {
    pub exercise_id: i64,
    pub change: ExerciseChange,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExerciseIdBody {
    pub exercise_id: i64,
}

/// Account changes sent to `/settings`
///
/// Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    pub delete_account: bool,
}

impl SettingsUpdate {
    /// Build an update from form fields, treating blank fields as unchanged
    pub fn from_fields(new_username: &str, new_password: &str) -> Self {
        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            new_username: non_blank(new_username),
            new_password: non_blank(new_password),
            delete_account: false,
        }
    }

    /// Request that deletes the account
    pub fn delete_account() -> Self {
        Self {
            new_username: None,
            new_password: None,
            delete_account: true,
        }
    }

    /// Whether the update would change nothing
    pub fn is_empty(&self) -> bool {
        !self.delete_account && self.new_username.is_none() && self.new_password.is_none()
    }
}
