//! Configuration CLI command handlers

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{Config, API_URL_ENV};
use crate::error::{PeakError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => handle_set(key, value),
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Remove { key } => handle_remove(key),
    }
}

/// Handle setting a configuration value
fn handle_set(key: ConfigKey, value: String) -> Result<()> {
    let mut config = Config::load()?;

    match key {
        ConfigKey::ApiUrl => {
            config.set_api_url(&value)?;
            config.save()?;
            println!("Server address set to: {}", config.api_url);
        }
        ConfigKey::RefreshInterval => {
            config.set_refresh_interval(parse_seconds(&value)?)?;
            config.save()?;
            println!("Refresh interval set to: {}s", config.refresh_interval_secs);
        }
        ConfigKey::RequestTimeout => {
            config.set_request_timeout(parse_seconds(&value)?)?;
            config.save()?;
            println!("Request timeout set to: {}s", config.request_timeout_secs);
        }
    }
    Ok(())
}

/// Handle getting a configuration value
fn handle_get(key: ConfigKey) -> Result<()> {
    let config = Config::load()?;

    match key {
        ConfigKey::ApiUrl => {
            let effective = config.effective_api_url();
            if effective != config.api_url {
                println!("Server address: {} (from {})", effective, API_URL_ENV);
            } else {
                println!("Server address: {}", config.api_url);
            }
        }
        ConfigKey::RefreshInterval => {
            println!("Refresh interval: {}s", config.refresh_interval_secs);
        }
        ConfigKey::RequestTimeout => {
            println!("Request timeout: {}s", config.request_timeout_secs);
        }
    }
    Ok(())
}

/// Handle resetting a configuration value
fn handle_remove(key: ConfigKey) -> Result<()> {
    let mut config = Config::load()?;
    let defaults = Config::default();

    match key {
        ConfigKey::ApiUrl => {
            config.api_url = defaults.api_url;
            config.save()?;
            println!("Server address reset to default: {}", config.api_url);
        }
        ConfigKey::RefreshInterval => {
            config.refresh_interval_secs = defaults.refresh_interval_secs;
            config.save()?;
            println!(
                "Refresh interval reset to default: {}s",
                config.refresh_interval_secs
            );
        }
        ConfigKey::RequestTimeout => {
            config.request_timeout_secs = defaults.request_timeout_secs;
            config.save()?;
            println!(
                "Request timeout reset to default: {}s",
                config.request_timeout_secs
            );
        }
    }
    Ok(())
}

fn parse_seconds(value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        PeakError::InvalidInput(format!(
            "Invalid number of seconds '{}'. Expected a whole number like 5.",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds(" 30 ").unwrap(), 30);
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }
}
