pub mod auth;
pub mod client;
pub mod error_handler;
pub mod exercises;
pub mod leaderboard;
pub mod models;
pub mod settings;

pub use auth::AuthHandler;
pub use client::FitnessClient;
pub use exercises::ExerciseHandler;
pub use leaderboard::LeaderboardHandler;
pub use models::{CustomExercise, LeaderboardEntry, SettingsUpdate};
pub use settings::SettingsHandler;
