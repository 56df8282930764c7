//! Platform-agnostic types for the bletrace BLE telemetry collector.
//!
//! This crate defines the data model shared by the scanning core and the
//! CLI: raw advertisement events as delivered by a scan backend, the
//! per-address device records they aggregate into, and the keyword-based
//! device classifier.
//!
//! No Bluetooth code lives here; everything is plain data that can be
//! serialized, compared, and tested without a radio.
//!
//! # Example
//!
//! ```
//! use bletrace_types::{AdvertisementEvent, Category, DeviceRecord};
//! use time::OffsetDateTime;
//!
//! let event = AdvertisementEvent {
//!     address: "AA:BB:CC:DD:EE:FF".to_string(),
//!     name: Some("iPhone 12".to_string()),
//!     rssi: Some(-50),
//!     received_at: OffsetDateTime::UNIX_EPOCH,
//!     ..Default::default()
//! };
//!
//! let record = DeviceRecord::from_event(&event);
//! assert_eq!(record.category(), Category::Phone);
//! ```

pub mod category;
pub mod record;

pub use category::Category;
pub use record::{format_company_id, AdvertisementEvent, DeviceRecord, ManufacturerBlock};
