//! Authentication CLI command handlers

use secrecy::SecretString;

use crate::cli::commands::AuthCommand;
use crate::cli::{prompt, resume_session};
use crate::core::config::Config;
use crate::core::credentials::{CredentialSource, CredentialStore};
use crate::core::session::Session;
use crate::core::validation::RegistrationForm;
use crate::error::{PeakError, Result};

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login { username } => handle_login(username).await,
        AuthCommand::Register { username } => handle_register(username).await,
        AuthCommand::Logout => handle_logout().await,
        AuthCommand::Status => handle_status(),
    }
}

/// Handle the login command
pub async fn handle_login(username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt("Username: ")?,
    };
    if username.is_empty() {
        return Err(PeakError::InvalidInput("No username provided".to_string()));
    }

    let password = prompt("Password: ")?;
    if password.is_empty() {
        return Err(PeakError::InvalidInput("No password provided".to_string()));
    }

    let session = Session::from_config(&Config::load()?)?;
    println!();
    println!("Logging in...");
    let message = session
        .login(&username, &SecretString::from(password))
        .await?;

    println!("✓ {}", message);
    println!("  Logged in as {}. Credentials saved for next time.", username);
    Ok(())
}

/// Handle the register command
async fn handle_register(username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt("Username: ")?,
    };

    println!("Passwords need 8+ characters with an uppercase letter, a lowercase letter and a number.");
    let password = prompt("Password: ")?;
    let confirm_password = prompt("Confirm password: ")?;

    let form = RegistrationForm::new(username, password, confirm_password);
    let session = Session::from_config(&Config::load()?)?;
    println!();
    println!("Creating account...");
    let message = session.register(&form).await?;

    println!("✓ Account created for {}.", form.username);
    println!("  {}", message);
    Ok(())
}

/// Handle the logout command
async fn handle_logout() -> Result<()> {
    if !CredentialStore::has_credentials()? {
        println!("Not currently logged in.");
        return Ok(());
    }

    let (session, username) = resume_session().await?;
    let message = session.logout().await?;
    println!("✓ {}", message);
    println!("  Stored credentials for {} have been removed.", username);
    Ok(())
}

/// Handle the status command
fn handle_status() -> Result<()> {
    let config = Config::load()?;

    println!("Authentication Status:");
    println!("  Server: {}", config.effective_api_url());

    match CredentialStore::get()? {
        Some(stored) => {
            let source = match stored.source {
                CredentialSource::Environment => "environment",
                CredentialSource::Keyring => "system keyring",
            };
            println!("  Username: {}", stored.credentials.username);
            println!(
                "  Password: {}",
                CredentialStore::mask_password(&stored.credentials.password)
            );
            println!("  Stored in: {}", source);
        }
        None => {
            println!("  Not logged in");
            println!();
            println!("  Log in with: peak auth login");
        }
    }

    Ok(())
}
