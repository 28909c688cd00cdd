//! Account settings CLI command handlers

use crate::api::SettingsUpdate;
use crate::cli::commands::SettingsCommand;
use crate::cli::{confirm, prompt, resume_session};
use crate::error::{PeakError, Result};

/// Handle `peak settings`
pub async fn handle_settings(command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Update { username, password } => handle_update(username, password).await,
        SettingsCommand::DeleteAccount { force } => handle_delete_account(force).await,
    }
}

async fn handle_update(username: Option<String>, ask_password: bool) -> Result<()> {
    let new_password = if ask_password {
        let password = prompt("New password: ")?;
        let confirm_password = prompt("Confirm new password: ")?;
        if password != confirm_password {
            return Err(PeakError::InvalidInput("Passwords do not match".to_string()));
        }
        password
    } else {
        String::new()
    };

    let update = SettingsUpdate::from_fields(username.as_deref().unwrap_or(""), &new_password);
    if update.is_empty() {
        return Err(PeakError::InvalidInput(
            "Nothing to update. Pass --username and/or --password.".to_string(),
        ));
    }

    let (session, _) = resume_session().await?;
    let message = session.update_settings(update).await?;
    println!("✓ {}", message);
    Ok(())
}

async fn handle_delete_account(force: bool) -> Result<()> {
    let (session, username) = resume_session().await?;

    if !force {
        println!("This permanently deletes '{}' and all recorded exercises.", username);
        if !confirm("Delete your account?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let message = session.delete_account().await?;
    println!("✓ {}", message);
    println!("  Stored credentials have been removed.");
    Ok(())
}
