//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations, plus the
//! merging of global flags with the configuration file.

use std::path::PathBuf;

use binv_core::config::InventoryConfig;
use binv_core::{ConfigManager, ConnectionConfig};
use clap::{Args, Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod buckets;
mod completions;
mod report;

/// binv - bucket inventory for S3-compatible storage
///
/// Reports object count, total size and most recent modification for every
/// bucket visible to your credentials. Runs `report` when no command is given.
#[derive(Parser, Debug)]
#[command(name = "binv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags accepted by every command
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Print progress for every bucket
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// AWS profile from the shared config files
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Region to send requests to
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Endpoint URL of an S3-compatible service
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "BINV_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inventory every bucket: object count, total size, last modification
    Report(report::ReportArgs),

    /// List buckets without walking their contents
    Buckets,

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Everything a command needs after flags and config file are merged
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: OutputConfig,
    pub connection: ConnectionConfig,
    pub inventory: InventoryConfig,
}

impl Settings {
    /// Load the configuration file and apply flag overrides
    pub fn resolve(global: &GlobalArgs) -> binv_core::Result<Self> {
        let manager = match &global.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new()?,
        };
        let config = manager.load()?;

        let output = OutputConfig {
            json: global.json,
            no_color: global.no_color,
            no_progress: global.no_progress,
            quiet: global.quiet,
            verbose: global.verbose,
        }
        .with_defaults(&config.defaults);

        let mut connection = config.connection;
        if let Some(profile) = &global.profile {
            connection.profile = Some(profile.clone());
        }
        if let Some(region) = &global.region {
            connection.region = Some(region.clone());
        }
        if let Some(endpoint) = &global.endpoint_url {
            connection.endpoint_url = Some(endpoint.clone());
        }
        connection.validate()?;

        Ok(Self {
            output,
            connection,
            inventory: config.inventory,
        })
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Report(report::ReportArgs::default()));

    if let Commands::Completions(args) = command {
        return completions::execute(args);
    }

    let settings = match Settings::resolve(&cli.global) {
        Ok(settings) => settings,
        Err(e) => {
            let formatter = Formatter::new(OutputConfig {
                json: cli.global.json,
                no_color: cli.global.no_color,
                ..Default::default()
            });
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    match command {
        Commands::Report(args) => report::execute(args, settings).await,
        Commands::Buckets => buckets::execute(settings).await,
        Commands::Completions(args) => completions::execute(args),
    }
}
