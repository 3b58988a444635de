//! fuzzyfind server & CLI
//!
//! Dual-mode application:
//! - Server Mode (no arguments or `serve`): line-delimited JSON-RPC on stdio
//! - CLI Mode: run one tool and print the result
//!
//! Implements two tools:
//! - `match(query, candidate)` - Test and score one candidate
//! - `filter(query, candidates)` - Rank a candidate list best-first

use anyhow::{Context, Result};
use clap::Parser;
use fuzzyfind::cli::{Cli, Commands, FilterArgs, MatchArgs};
use fuzzyfind::config::{self, Config};
use fuzzyfind::error::AppError;
use fuzzyfind::server::{self, ToolResult};
use fuzzyfind::tools;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Detect mode: CLI if args present, server otherwise
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        run_cli_mode().await
    } else {
        run_server_mode().await
    }
}

/// Run in CLI mode
async fn run_cli_mode() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags; RUST_LOG wins when set
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    init_logging(log_level);

    let result = match cli.command {
        Some(Commands::Match(args)) => execute_match_cli(args, cli.config.as_deref()),
        Some(Commands::Filter(args)) => execute_filter_cli(args, cli.config.as_deref()).await,
        Some(Commands::Serve) => {
            return server::handle_stdio(load_effective_config(cli.config.as_deref())?).await;
        }
        None => {
            eprintln!("Error: No command specified. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    // Handle result and exit with appropriate code
    match result {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

/// Execute match command in CLI mode
fn execute_match_cli(args: MatchArgs, config_path: Option<&Path>) -> Result<String> {
    let config = load_effective_config(config_path)?;
    let json = args.json;
    let result = tools::score::execute_match(args, &config)?;
    render(&result, json)
}

/// Execute filter command in CLI mode
async fn execute_filter_cli(mut args: FilterArgs, config_path: Option<&Path>) -> Result<String> {
    let config = load_effective_config(config_path)?;

    if let Some(file) = &args.file {
        let data = tokio::fs::read_to_string(file)
            .await
            .map_err(AppError::from)
            .with_context(|| format!("Failed to read candidates from {}", file.display()))?;
        args.candidates.extend(data.lines().map(str::to_string));
    } else if args.candidates.is_empty() {
        debug!("Reading candidates from stdin");
        let mut lines = AsyncBufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.map_err(AppError::from)? {
            args.candidates.push(line);
        }
    }

    let json = args.json;
    let result = tools::filter::execute_filter(args, &config)?;
    render(&result, json)
}

/// Text of the first content item, or its metadata as pretty JSON
fn render(result: &ToolResult, json: bool) -> Result<String> {
    let Some(item) = result.content.first() else {
        return Ok(String::new());
    };

    if json {
        let value = item.metadata.clone().unwrap_or(serde_json::Value::Null);
        Ok(serde_json::to_string_pretty(&value).context("Failed to encode result")?)
    } else {
        Ok(item.text.clone())
    }
}

/// Load the config: an explicit path must be readable, the default location
/// falls back to defaults
fn load_effective_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config_from(path)
            .map_err(|e| AppError::Config(format!("{:#}", e)).into()),
        None => match config::load_config() {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("Ignoring unreadable config: {:#}", e);
                Ok(Config::default())
            }
        },
    }
}

fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();
}

/// Map an error to the process exit code
fn get_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(app_error) => app_error.exit_code(),
        None => 5,
    }
}

/// Run in server mode
async fn run_server_mode() -> Result<()> {
    init_logging("info");

    info!("Starting fuzzyfind server");
    let config_path = std::env::var_os("FUZZYFIND_CONFIG").map(PathBuf::from);
    let config = load_effective_config(config_path.as_deref())?;

    server::handle_stdio(config).await
}
