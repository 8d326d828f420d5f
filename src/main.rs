//! basics-mcp: a minimal MCP server with ping, sum and calendar tools.
//!
//! Speaks MCP over stdio. Logs go to stderr.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use basics_mcp::calendar::{CalendarProvider, GoogleCalendarClient, SystemClock};
use basics_mcp::config::{self, Config};
use basics_mcp::mcp::{McpServer, StdioTransport};
use basics_mcp::tools::ToolRegistry;

/// Minimal MCP server exposing ping, sum and calendar day lookup tools.
///
/// The calendar credential is read from GOOGLE_API_KEY or
/// GOOGLE_ACCESS_TOKEN (a `.env` file in the working directory is honoured).
#[derive(Parser, Debug)]
#[command(name = "basics-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// stdout carries protocol messages, so logs must go to stderr.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file and applies environment overrides.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, basics_mcp::error::ConfigError> {
    let mut cfg = config::load_config(path)?;
    config::apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Builds the calendar provider, if the calendar tool is enabled.
fn build_calendar(cfg: &Config) -> Result<Option<Arc<dyn CalendarProvider>>, String> {
    if !cfg.tools.calendar_enabled {
        info!("Calendar tool disabled by configuration");
        return Ok(None);
    }

    let credential = config::credential_from_env(|key| std::env::var(key).ok());
    if credential.is_none() {
        warn!(
            "No calendar credential found in {} or {}; calendar lookups will report an error",
            config::API_KEY_ENV,
            config::ACCESS_TOKEN_ENV
        );
    }

    let base_url = cfg.calendar.api_base_url().map_err(|e| e.to_string())?;
    let client = GoogleCalendarClient::new(base_url, cfg.calendar.calendar_id.clone(), credential)
        .map_err(|e| e.to_string())?;

    info!(
        calendar_id = %client.calendar_id(),
        tool = %cfg.tools.calendar_tool_name,
        "Calendar tool enabled"
    );

    Ok(Some(Arc::new(client)))
}

/// Entry point for the basics-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let dotenv = dotenvy::dotenv();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nDefault config location: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "basics-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting basics-mcp server"
    );

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }

    let calendar = match build_calendar(&cfg) {
        Ok(calendar) => calendar,
        Err(e) => {
            error!(error = %e, "Failed to set up calendar client");
            return ExitCode::FAILURE;
        }
    };

    let tools = ToolRegistry::new(&cfg.tools, calendar, Arc::new(SystemClock));
    let mut server = McpServer::new(StdioTransport::stdio(), tools);

    info!("MCP server ready, waiting for client connection...");

    // Run the server
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    exit_code(&runtime.block_on(server.run()))
}

/// Maps the outcome of the server loop to the process exit code.
fn exit_code(result: &io::Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn server_outcome_sets_exit_code() {
        let code = |result: io::Result<()>| format!("{:?}", exit_code(&result));

        assert_eq!(code(Ok(())), format!("{:?}", ExitCode::SUCCESS));

        let broken = io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed");
        assert_eq!(code(Err(broken)), format!("{:?}", ExitCode::FAILURE));
        assert_ne!(code(Ok(())), code(Err(io::ErrorKind::InvalidData.into())));
    }

    #[test]
    fn log_level_selection() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
        assert_eq!(get_log_level(5, false, "error"), Level::TRACE);
    }
}
