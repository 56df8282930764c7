//! Command-line BLE telemetry collector.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod format;

use commands::config_cmd::ConfigAction;
use config::Config;
use format::OutputFormat;

#[derive(Parser)]
#[command(name = "bletrace")]
#[command(author, version, about = "Scan for BLE devices and collect advertisement telemetry", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scan session: live per-device output, summary, JSON export
    Scan {
        /// Scan duration in seconds (default from config, else 30)
        #[arg(short, long, env = "BLETRACE_TIMEOUT")]
        timeout: Option<u64>,

        /// Export destination (default from config, else ble_scan_results.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip writing the export file
        #[arg(long)]
        no_export: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Quick discovery: list distinct nearby devices, one line each
    Discover {
        /// Scan duration in seconds
        #[arg(short, long, default_value = "8")]
        timeout: u64,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "bletrace", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load();
    tracing::debug!("using config from {}", Config::path().display());

    match cli.command {
        Commands::Scan {
            timeout,
            output,
            no_export,
            format,
        } => {
            commands::scan::cmd_scan(
                timeout,
                output.as_ref(),
                no_export,
                format,
                cli.quiet,
                &config,
            )
            .await
        }
        Commands::Discover { timeout } => commands::discover::cmd_discover(timeout).await,
        Commands::Config { action } => commands::config_cmd::cmd_config(action, config),
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }
}
