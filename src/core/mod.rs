//! Core functionality for peak-fitness
//!
//! Shared by the CLI and the TUI:
//! - Application configuration
//! - Credential storage
//! - Optimistic exercise counters
//! - Registration validation
//! - Session flows

pub mod config;
pub mod credentials;
pub mod counter;
pub mod session;
pub mod validation;

pub use config::Config;
pub use credentials::{CredentialStore, CredentialVault, Credentials, KeyringVault};
pub use counter::{ExerciseChange, ExerciseKind, OptimisticCounter, PendingChange};
pub use session::{AutoLogin, Session};
pub use validation::RegistrationForm;
