//! # Taleweave CLI
//!
//! Command-line client for the Taleweave platform.
//!
//! This CLI provides commands for:
//! - Signing in and out
//! - Reading stories, journal entries, and notifications
//! - Watching the live event feed

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use taleweave_client::AppContext;
use taleweave_core::config::{ConfigLoader, ENV_PREFIX, TaleweaveConfig};
use taleweave_telemetry::logging::{LogConfig, init_logging};

use commands::{auth, resources, watch};

/// Directory used for the persisted session when none is configured.
const DEFAULT_STATE_DIR: &str = ".taleweave";

/// Taleweave - therapeutic storytelling platform client
#[derive(Parser)]
#[command(name = "taleweave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (YAML, TOML, or JSON)
    #[arg(short, long, global = true, env = "TALEWEAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Sign in
    Login(auth::LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List stories
    Stories,

    /// List journal entries
    Journal,

    /// List notifications
    Notifications,

    /// Watch live updates
    Watch(watch::WatchArgs),

    /// Show client configuration
    Info,
}

fn load_config(path: Option<&Path>) -> Result<TaleweaveConfig> {
    let mut config: TaleweaveConfig = ConfigLoader::new()
        .with_env_prefix(ENV_PREFIX)
        .load(path)
        .context("Failed to load configuration")?;
    if config.storage.directory.is_none() {
        config.storage.directory = Some(PathBuf::from(DEFAULT_STATE_DIR));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let mut log_config = LogConfig::from(&config.logging);
    if cli.verbose {
        log_config.level = "debug".to_string();
    }
    let _guards = init_logging(&log_config).context("Failed to initialize logging")?;

    let context = AppContext::new(config).context("Failed to initialize client")?;

    match cli.command {
        Commands::Login(args) => auth::login(&context, args).await?,
        Commands::Logout => auth::logout(&context).await,
        Commands::Whoami => auth::whoami(&context).await?,
        Commands::Stories => resources::stories(&context).await,
        Commands::Journal => resources::journal(&context).await,
        Commands::Notifications => resources::notifications(&context).await,
        Commands::Watch(args) => watch::run(&context, args).await?,
        Commands::Info => print_info(&context),
    }

    Ok(())
}

fn print_info(context: &AppContext) {
    let config = context.config();
    println!("Taleweave Client");
    println!("================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Endpoints:");
    println!("  API:      {}", config.api.base_url);
    println!("  Realtime: {}", config.realtime.socket_url);
    println!(
        "  Reconnect: up to {} attempts",
        config.realtime.max_reconnect_attempts
    );
    println!();
    println!("Session:");
    match context.persistence() {
        Some(persistence) => println!("  Stored at: {}", persistence.path().display()),
        None => println!("  Not persisted"),
    }
    match context.store().user() {
        Some(user) => println!("  Signed in as {} ({})", user.name, user.role),
        None => println!("  Signed out"),
    }
    println!(
        "  Live updates: {}",
        if context.store().live_updates() {
            "on"
        } else {
            "off"
        }
    );
}
