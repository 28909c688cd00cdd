//! CLI module for peak-fitness
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod auth;
pub mod commands;
pub mod config;
pub mod exercise;
pub mod leaderboard;
pub mod settings;

use std::io::{self, Write};

use crate::core::config::Config;
use crate::core::session::Session;
use crate::error::Result;

pub use commands::{Cli, Commands};

/// Session against the configured server, logged in from stored credentials
pub(crate) async fn resume_session() -> Result<(Session, String)> {
    let config = Config::load()?;
    let session = Session::from_config(&config)?;
    let username = session.resume().await?;
    Ok((session, username))
}

/// Print a prompt and read one trimmed line from stdin
pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask a yes/no question, defaulting to no
pub(crate) fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
