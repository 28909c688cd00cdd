//! peak - Peak Fitness terminal client
//!
//! Track pushups, pull-ups and custom exercises against the Peak Fitness
//! server. Run without arguments to launch the TUI, or use subcommands for
//! CLI mode.
//!
//! Available as the `peak` command.

use std::io::{self, Write};

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use peak_fitness::cli::commands::{Cli, Commands};
use peak_fitness::cli::{auth, config, exercise, leaderboard, settings};
use peak_fitness::core::config::Config;
use peak_fitness::error::{PeakError, Result};
use peak_fitness::tui::App;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it logs to a file instead of stderr
    let _guard = if cli.command.is_none() {
        init_file_logging()
    } else {
        init_stderr_logging();
        None
    };

    if let Err(e) = run(cli).await {
        handle_error(e).await;
        std::process::exit(1);
    }
}

fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Log to a daily file in the data directory. The guard must outlive the app.
fn init_file_logging() -> Option<WorkerGuard> {
    let logs_dir = Config::log_dir().ok()?;
    std::fs::create_dir_all(&logs_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "peak-fitness.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,peak_fitness=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    Some(guard)
}

/// Print the error, offering to log in when that is what's missing
async fn handle_error(e: PeakError) {
    match &e {
        PeakError::NotAuthenticated => {
            eprintln!();
            eprintln!("You are not logged in to Peak Fitness.");
            eprintln!();
            offer_login().await;
        }
        _ => {
            eprintln!("Error: {}", e);
        }
    }
}

/// Offer an interactive login
async fn offer_login() {
    eprint!("Log in now? [Y/n] ");
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        let choice = input.trim().to_lowercase();
        if choice.is_empty() || choice == "y" || choice == "yes" {
            eprintln!();
            if let Err(e) = auth::handle_login(None).await {
                eprintln!("Login failed: {}", e);
            } else {
                eprintln!();
                eprintln!("Please run your command again.");
            }
        } else {
            eprintln!();
            eprintln!("You can log in later with: peak auth login");
            eprintln!("New here? Create an account with: peak auth register");
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        // No subcommand - launch TUI mode
        None => run_tui().await,

        Some(Commands::Auth(args)) => auth::handle_auth(args.command).await,
        Some(Commands::Count(args)) => exercise::handle_count(args).await,
        Some(Commands::Custom(args)) => exercise::handle_custom(args.command).await,
        Some(Commands::Leaderboard(args)) => leaderboard::handle_leaderboard(args).await,
        Some(Commands::Settings(args)) => settings::handle_settings(args.command).await,
        Some(Commands::Config(args)) => config::handle_config(args.command),
    }
}

/// Run the TUI application
async fn run_tui() -> Result<()> {
    let config = Config::load()?;
    tracing::info!(api_url = %config.effective_api_url(), "Starting TUI");

    let mut app = App::new(&config)?;
    app.run().await
}
