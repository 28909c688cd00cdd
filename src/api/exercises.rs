//! Built-in and custom exercise counter endpoints

use reqwest::Method;

use crate::api::client::FitnessClient;
use crate::api::models::{
    ChangeBody, CustomExercise, ExerciseChangeBody, ExerciseIdBody, NewExerciseBody,
};
use crate::core::counter::{ExerciseChange, ExerciseKind};
use crate::error::{PeakError, Result};

/// Handler for exercise counters
pub struct ExerciseHandler<'a> {
    client: &'a FitnessClient,
}

impl<'a> ExerciseHandler<'a> {
    /// Create a new exercise handler
    pub fn new(client: &'a FitnessClient) -> Self {
        Self { client }
    }

    /// Current count of a built-in exercise
    pub async fn get_count(&self, kind: ExerciseKind) -> Result<i64> {
        let request = self.client.request(Method::GET, kind.path());
        self.client
            .send_for_count(request, "Failed to fetch count")
            .await
    }

    /// Adjust a built-in exercise and return the server's new count
    pub async fn update_count(&self, kind: ExerciseKind, change: ExerciseChange) -> Result<i64> {
        let request = self
            .client
            .request(Method::POST, kind.path())
            .json(&ChangeBody { change });
        self.client
            .send_for_count(request, "Failed to update count")
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Custom exercises
    // ─────────────────────────────────────────────────────────────────────────

    /// All custom exercises of the logged-in user
    pub async fn list_custom(&self) -> Result<Vec<CustomExercise>> {
        let request = self.client.request(Method::GET, "exercises");
        self.client
            .send_json(request, "Failed to fetch exercises")
            .await
    }

    /// Create a custom exercise starting at zero
    pub async fn add_custom(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PeakError::InvalidInput(
                "Exercise name cannot be empty".to_string(),
            ));
        }

        let request = self
            .client
            .request(Method::POST, "exercises")
            .json(&NewExerciseBody {
                exercise_name: name,
            });
        self.client
            .send_for_status(
                request,
                "Exercise added successfully",
                "Failed to add exercise",
            )
            .await
    }

    /// Adjust a custom exercise and return the server's new count
    pub async fn update_custom(&self, exercise_id: i64, change: ExerciseChange) -> Result<i64> {
        let request = self
            .client
            .request(Method::PUT, "exercises")
            .json(&ExerciseChangeBody {
                exercise_id,
                change,
            });
        self.client
            .send_for_count(request, "Failed to update count")
            .await
    }

    /// Delete a custom exercise
    pub async fn delete_custom(&self, exercise_id: i64) -> Result<String> {
        let request = self
            .client
            .request(Method::DELETE, "exercises")
            .json(&ExerciseIdBody { exercise_id });
        self.client
            .send_for_status(
                request,
                "Exercise deleted successfully",
                "Failed to delete exercise",
            )
            .await
    }

    /// Look up one custom exercise by id
    pub async fn find_custom(&self, exercise_id: i64) -> Result<CustomExercise> {
        self.list_custom()
            .await?
            .into_iter()
            .find(|e| e.id == exercise_id)
            .ok_or(PeakError::ExerciseNotFound(exercise_id))
    }
}
