//! Leaderboard CLI command handler

use crate::api::{LeaderboardEntry, LeaderboardHandler};
use crate::cli::commands::LeaderboardArgs;
use crate::cli::resume_session;
use crate::error::Result;

/// Handle `peak leaderboard`
pub async fn handle_leaderboard(args: LeaderboardArgs) -> Result<()> {
    let (session, username) = resume_session().await?;
    let entries = LeaderboardHandler::new(session.api()).fetch().await?;

    if entries.is_empty() {
        println!("The leaderboard is empty.");
        return Ok(());
    }

    let limit = args.limit.unwrap_or(entries.len());
    println!("{}", format_leaderboard(&entries[..limit.min(entries.len())], &username));
    Ok(())
}

/// Render entries in the order given, marking the current user
fn format_leaderboard(entries: &[LeaderboardEntry], current_user: &str) -> String {
    let name_width = entries
        .iter()
        .map(|e| e.username.chars().count())
        .max()
        .unwrap_or(0)
        .max("USER".len());

    let mut lines = vec![format!(
        "  {:>3}  {:<name_width$}  {:>7}  {:>7}  {:>7}",
        "#", "USER", "POINTS", "PUSHUPS", "PULLUPS"
    )];

    for (rank, entry) in entries.iter().enumerate() {
        let marker = if entry.username == current_user {
            " ←"
        } else {
            ""
        };
        lines.push(format!(
            "  {:>3}  {:<name_width$}  {:>7}  {:>7}  {:>7}{}",
            rank + 1,
            entry.username,
            entry.points,
            entry.pushups,
            entry.pullups,
            marker
        ));
    }

    lines.join("\n")
}
