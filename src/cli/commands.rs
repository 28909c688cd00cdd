//! CLI command definitions using clap
//!
//! Defines the command structure for the `peak` CLI tool.

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::counter::{ExerciseChange, ExerciseKind};

/// peak - Peak Fitness in your terminal
///
/// Track pushups, pull-ups and custom exercises and follow the leaderboard.
/// Run without arguments to launch the TUI mode.
#[derive(Parser, Debug)]
#[command(name = "peak", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, register or log out
    Auth(AuthArgs),

    /// Show or change the pushup and pull-up counters
    Count(CountArgs),

    /// Manage custom exercises
    Custom(CustomArgs),

    /// Show the leaderboard
    Leaderboard(LeaderboardArgs),

    /// Change account settings
    Settings(SettingsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in and remember the credentials
    Login {
        /// Account name (prompted for when omitted)
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Create an account and log in
    Register {
        /// Account name (prompted for when omitted)
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Log out and remove stored credentials
    Logout,
    /// Show current authentication status
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Counter Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Built-in counter commands
#[derive(Parser, Debug)]
pub struct CountArgs {
    /// Which counter
    pub exercise: ExerciseArg,

    /// Apply a change instead of only showing the count
    #[arg(long, short)]
    pub change: Option<ChangeArg>,
}

/// Built-in exercise selection
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExerciseArg {
    Pushups,
    Pullups,
}

impl From<ExerciseArg> for ExerciseKind {
    fn from(arg: ExerciseArg) -> Self {
        match arg {
            ExerciseArg::Pushups => ExerciseKind::Pushups,
            ExerciseArg::Pullups => ExerciseKind::Pullups,
        }
    }
}

/// Counter adjustment
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChangeArg {
    /// Add one
    #[value(name = "increase")]
    Increase,
    /// Add ten
    #[value(name = "increase10")]
    Increase10,
    /// Subtract one
    #[value(name = "decrease")]
    Decrease,
    /// Subtract ten
    #[value(name = "decrease10")]
    Decrease10,
}

impl From<ChangeArg> for ExerciseChange {
    fn from(arg: ChangeArg) -> Self {
        match arg {
            ChangeArg::Increase => ExerciseChange::Increase,
            ChangeArg::Increase10 => ExerciseChange::IncreaseTen,
            ChangeArg::Decrease => ExerciseChange::Decrease,
            ChangeArg::Decrease10 => ExerciseChange::DecreaseTen,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Custom Exercise Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Custom exercise commands
#[derive(Parser, Debug)]
pub struct CustomArgs {
    #[command(subcommand)]
    pub command: CustomCommand,
}

#[derive(Subcommand, Debug)]
pub enum CustomCommand {
    /// List custom exercises
    List,

    /// Add a custom exercise
    Add {
        /// Exercise name
        name: String,
    },

    /// Delete a custom exercise
    Delete {
        /// Exercise id (see `peak custom list`)
        id: i64,

        /// Delete without confirmation
        #[arg(long, short)]
        force: bool,
    },

    /// Show or change a custom exercise's count
    Count {
        /// Exercise id (see `peak custom list`)
        id: i64,

        /// Apply a change instead of only showing the count
        #[arg(long, short)]
        change: Option<ChangeArg>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaderboard Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Leaderboard options
#[derive(Parser, Debug)]
pub struct LeaderboardArgs {
    /// Maximum number of users to show
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Account settings commands
#[derive(Parser, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Change username and/or password
    Update {
        /// New username
        #[arg(long, short)]
        username: Option<String>,

        /// Prompt for a new password
        #[arg(long, short)]
        password: bool,
    },

    /// Permanently delete the account
    DeleteAccount {
        /// Delete without confirmation
        #[arg(long, short)]
        force: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,

        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Reset a configuration value to its default
    Remove {
        /// Configuration key
        key: ConfigKey,
    },
}

/// Available configuration keys
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigKey {
    /// Peak Fitness server address
    #[value(name = "api-url")]
    ApiUrl,

    /// Counter refresh interval in seconds (TUI)
    #[value(name = "refresh-interval")]
    RefreshInterval,

    /// Request timeout in seconds
    #[value(name = "request-timeout")]
    RequestTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_counter_change() {
        let cli = Cli::try_parse_from(["peak", "count", "pullups", "--change", "increase10"])
            .unwrap();
        match cli.command {
            Some(Commands::Count(args)) => {
                assert!(matches!(args.exercise, ExerciseArg::Pullups));
                assert_eq!(
                    args.change.map(ExerciseChange::from),
                    Some(ExerciseChange::IncreaseTen)
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_change() {
        assert!(Cli::try_parse_from(["peak", "count", "pushups", "--change", "double"]).is_err());
    }

    #[test]
    fn test_no_subcommand_launches_tui() {
        let cli = Cli::try_parse_from(["peak"]).unwrap();
        assert!(cli.command.is_none());
    }
}
