//! mcp-server-store: Model Context Protocol server for an online store
//!
//! Speaks newline-delimited JSON-RPC 2.0 on stdin/stdout; all diagnostics
//! go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

use mcp_server_store::config;
use mcp_server_store::logging::LogControl;
use mcp_server_store::mcp::McpServer;
use mcp_server_store::tools;

/// MCP server for an online store.
///
/// Exposes store tools, resources, and prompts to AI assistants over stdio.
#[derive(Parser, Debug)]
#[command(name = "mcp-server-store")]
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

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(
        long,
        env = "LOG_LEVEL",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(config::VALID_LOG_LEVELS)
    )]
    log_level: Option<String>,
}

/// Parses a level name. Names are validated before they get here (CLI by
/// clap, config by [`config::Config::validate`]); WARN is the fallback.
fn parse_level(name: &str) -> LevelFilter {
    match name.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::WARN,
    }
}

/// Determines the log level from CLI arguments and configuration.
fn get_log_level(
    verbose: u8,
    quiet: bool,
    cli_level: Option<&str>,
    config_level: &str,
) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }

    match verbose {
        0 => parse_level(cli_level.unwrap_or(config_level)),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Entry point for the mcp-server-store server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(
        args.verbose,
        args.quiet,
        args.log_level.as_deref(),
        &cfg.logging.level,
    );
    let log = LogControl::install(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting mcp-server-store"
    );

    let mut server = McpServer::new(cfg.server.name, env!("CARGO_PKG_VERSION"), log);
    if let Some(instructions) = cfg.server.instructions {
        server = server.with_instructions(instructions);
    }

    tools::register_builtin(&server);
    info!(tools = server.list_tools().len(), "Registered tools");

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

    match runtime.block_on(server.serve_stdio()) {
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
