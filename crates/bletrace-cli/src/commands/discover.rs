//! Discover command: a fixed-window scan that lists each distinct device
//! once, without telemetry detail or export.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use bletrace_core::{get_adapter, run_session, BtleplugSource, SessionOptions};

pub async fn cmd_discover(timeout: u64) -> Result<()> {
    let adapter = get_adapter()
        .await
        .context("No usable Bluetooth adapter found")?;
    let source = BtleplugSource::new(adapter);

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    println!("Scanning for Bluetooth LE devices...");

    let report = run_session(
        source,
        SessionOptions::new().duration_secs(timeout),
        cancel,
        |_, _| {},
    )
    .await
    .context("Scan session failed")?;

    if report.registry.is_empty() {
        println!("No BLE devices found.");
        return Ok(());
    }

    println!("Found {} BLE devices:", report.registry.len());
    let devices = report.registry.as_sorted_map();
    for (address, record) in devices {
        println!("  {} - {}", address, record.name);
    }

    Ok(())
}
