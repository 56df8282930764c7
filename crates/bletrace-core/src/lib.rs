//! Core scanning library for the bletrace BLE telemetry collector.
//!
//! This crate owns everything between the platform Bluetooth stack and the
//! CLI: the advertisement source abstraction (with a btleplug-backed
//! production implementation and a hardware-free mock), the bounded-lifetime
//! scan session, the per-address device registry, and the summary/export
//! stage.
//!
//! # Quick Start
//!
//! ```no_run
//! use bletrace_core::{export, session, source};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = source::get_adapter().await?;
//!     let backend = source::BtleplugSource::new(adapter);
//!
//!     let report = session::run_session(
//!         backend,
//!         session::SessionOptions::new().duration_secs(15),
//!         CancellationToken::new(),
//!         |_event, record| println!("{} - {}", record.address, record.name),
//!     )
//!     .await?;
//!
//!     println!("{} device(s) found", report.registry.len());
//!     export::export_registry(&report.registry, "ble_scan_results.json".as_ref())?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod export;
pub mod mock;
pub mod registry;
pub mod session;
pub mod source;

pub use error::{Error, Result};
pub use export::{export_registry, import_registry, Summary};
pub use registry::DeviceRegistry;
pub use session::{run_session, SessionOptions, SessionReport, StopReason};
pub use source::{get_adapter, AdvertisementSource, BtleplugSource};

// Re-export the shared data model so downstream crates only need one
// dependency for the common case.
pub use bletrace_types::{AdvertisementEvent, Category, DeviceRecord, ManufacturerBlock};
