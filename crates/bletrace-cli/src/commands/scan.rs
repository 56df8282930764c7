//! Scan command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use bletrace_core::{
    export_registry, get_adapter, run_session, BtleplugSource, SessionOptions, StopReason,
};

use crate::config::Config;
use crate::format::{
    format_event_block, format_report_json, format_summary_text, FormatOptions, OutputFormat,
};

/// Default scan window when neither the flag nor the config specifies one.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default export destination.
const DEFAULT_EXPORT: &str = "ble_scan_results.json";

pub async fn cmd_scan(
    timeout: Option<u64>,
    output: Option<&PathBuf>,
    no_export: bool,
    format: OutputFormat,
    quiet: bool,
    config: &Config,
) -> Result<()> {
    let timeout = timeout.or(config.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
    let destination: PathBuf = output
        .cloned()
        .or_else(|| config.export.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT));
    let opts = FormatOptions {
        no_color: config.no_color,
    };

    let adapter = get_adapter()
        .await
        .context("No usable Bluetooth adapter found")?;
    let source = BtleplugSource::new(adapter);

    // Ctrl+C takes the same stop path as the timeout.
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    if !quiet && matches!(format, OutputFormat::Text) {
        println!(
            "Scanning for BLE devices for {} seconds...\nPress Ctrl+C to stop early\n",
            timeout
        );
    }

    let live_output = !quiet && matches!(format, OutputFormat::Text);
    let report = run_session(
        source,
        SessionOptions::new().duration_secs(timeout),
        cancel,
        |_event, record| {
            if live_output {
                println!("{}", format_event_block(record, &opts));
            }
        },
    )
    .await
    .context("Scan session failed")?;

    if report.stop_reason == StopReason::UserCancelled && live_output {
        eprintln!("\nScan stopped by user");
    }

    match format {
        OutputFormat::Text => print!("{}", format_summary_text(&report.registry, &opts)),
        OutputFormat::Json => println!("{}", format_report_json(&report)?),
    }

    if !no_export {
        export(&report.registry, &destination, quiet)?;
    }

    Ok(())
}

fn export(registry: &bletrace_core::DeviceRegistry, path: &Path, quiet: bool) -> Result<()> {
    export_registry(registry, path)
        .with_context(|| format!("Failed to export scan results to {}", path.display()))?;
    if !quiet {
        println!("Scan results saved to {}", path.display());
    }
    Ok(())
}
