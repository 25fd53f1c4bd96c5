//! cmdext CLI Binary
//!
//! Host command line: built-in commands plus extension commands loaded from
//! the configured store at startup.

use anyhow::Context;
use clap::Parser;
use cmdext::actions::builtin_registry;
use cmdext::cli::{exit_code, map_error, Cli, RunContext};
use cmdext::config::{CliConfig, ConfigLoader};
use cmdext::logging::{init_logging, LoggingConfig};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match setup(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    info!("cmdext starting");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
            info!("Interrupted, cancelled extension loading");
        }
        // Second interrupt exits
        if tokio::signal::ctrl_c().await.is_ok() {
            process::exit(130);
        }
    });

    let context = RunContext::new(config, builtin_registry(), cancel);

    let mut out = std::io::stdout();
    let mut err = std::io::stderr();
    match context.execute(&cli, &mut out, &mut err).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e).trim_end());
            process::exit(exit_code(&e));
        }
    }
}

/// Load configuration and initialize logging from it.
fn setup(cli: &Cli) -> anyhow::Result<CliConfig> {
    let config =
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let logging_config = build_logging_config(cli, &config);
    init_logging(&logging_config).context("Failed to initialize logging")?;
    Ok(config)
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, config: &CliConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();

    if cli.quiet {
        logging.enabled = false;
    }
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }

    logging
}
