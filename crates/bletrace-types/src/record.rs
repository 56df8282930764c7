//! Advertisement events and aggregated device records.

use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::category::Category;

/// Display name used when an advertisement carries no name at all.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A single BLE advertisement observation, as delivered by a scan backend.
///
/// Fields map directly onto what the platform Bluetooth stack exposes for
/// one advertisement: everything except the address is optional, and a
/// missing field is simply absent rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementEvent {
    /// Stable device identifier (MAC address, or a platform UUID on macOS).
    pub address: String,
    /// Device name reported by the stack, if any.
    pub name: Option<String>,
    /// Signal strength in dBm at the time of observation.
    pub rssi: Option<i16>,
    /// Advertised service UUIDs, in the order they appeared in the packet.
    /// Duplicates are preserved.
    pub service_uuids: Vec<Uuid>,
    /// Manufacturer-specific payloads keyed by company identifier.
    pub manufacturer_data: HashMap<u16, Vec<u8>>,
    /// Local name field from the advertisement packet, if present.
    pub local_name: Option<String>,
    /// Advertised TX power level in dBm, if present.
    pub tx_power: Option<i16>,
    /// When this observation was received.
    pub received_at: OffsetDateTime,
}

impl Default for AdvertisementEvent {
    fn default() -> Self {
        Self {
            address: String::new(),
            name: None,
            rssi: None,
            service_uuids: Vec::new(),
            manufacturer_data: HashMap::new(),
            local_name: None,
            tx_power: None,
            received_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

/// One manufacturer-data payload, rendered for export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManufacturerBlock {
    /// Payload bytes as lowercase hex.
    pub hex: String,
    /// Payload length in bytes.
    pub length: usize,
}

impl ManufacturerBlock {
    /// Build a block from raw payload bytes.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        use std::fmt::Write;

        let mut hex = String::with_capacity(data.len() * 2);
        for byte in data {
            let _ = write!(hex, "{:02x}", byte);
        }
        Self {
            hex,
            length: data.len(),
        }
    }
}

/// Render a Bluetooth company identifier as exactly four uppercase,
/// zero-padded hex digits.
///
/// # Examples
///
/// ```
/// use bletrace_types::format_company_id;
///
/// assert_eq!(format_company_id(0x0006), "0006");
/// assert_eq!(format_company_id(0x004C), "004C");
/// assert_eq!(format_company_id(0xFFFF), "FFFF");
/// ```
#[must_use]
pub fn format_company_id(id: u16) -> String {
    format!("{:04X}", id)
}

/// The registry's view of one device: the fields of its most recent
/// advertisement, keyed by address.
///
/// A record is built wholesale from a single [`AdvertisementEvent`]; the
/// registry replaces the entire record when a later event arrives for the
/// same address, so no field here ever mixes two observations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceRecord {
    /// Stable device identifier; the registry key.
    pub address: String,
    /// Display name, or `"Unknown"` when the advertisement carried none.
    pub name: String,
    /// Last-observed signal strength in dBm.
    pub rssi: Option<i16>,
    /// Time of the last observation.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Advertised service UUIDs from the last event, order preserved,
    /// duplicates not suppressed.
    pub service_uuids: Vec<String>,
    /// Manufacturer payloads keyed by company ID as 4-digit uppercase hex.
    pub manufacturer_data: BTreeMap<String, ManufacturerBlock>,
    /// Local name field, or `"Unknown"` when absent.
    pub local_name: String,
    /// Advertised TX power in dBm, if present.
    pub tx_power: Option<i16>,
}

impl DeviceRecord {
    /// Build a record purely from the fields of one event.
    ///
    /// Missing names default to the explicit `"Unknown"` sentinel rather
    /// than an absent field, matching the export document format.
    #[must_use]
    pub fn from_event(event: &AdvertisementEvent) -> Self {
        let manufacturer_data = event
            .manufacturer_data
            .iter()
            .map(|(id, data)| (format_company_id(*id), ManufacturerBlock::from_bytes(data)))
            .collect();

        Self {
            address: event.address.clone(),
            name: event
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            rssi: event.rssi,
            timestamp: event.received_at,
            service_uuids: event.service_uuids.iter().map(Uuid::to_string).collect(),
            manufacturer_data,
            local_name: event
                .local_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            tx_power: event.tx_power,
        }
    }

    /// Classify this device by its display name.
    #[must_use]
    pub fn category(&self) -> Category {
        Category::from_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event_with_name(address: &str, name: Option<&str>) -> AdvertisementEvent {
        AdvertisementEvent {
            address: address.to_string(),
            name: name.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_defaults_missing_name() {
        let record = DeviceRecord::from_event(&event_with_name("AA:BB", None));
        assert_eq!(record.name, "Unknown");
        assert_eq!(record.local_name, "Unknown");
        assert_eq!(record.category(), Category::Unknown);
    }

    #[test]
    fn test_record_carries_all_event_fields() {
        let mut manufacturer_data = HashMap::new();
        manufacturer_data.insert(6u16, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let uuid = Uuid::parse_str("0000180f-0000-1000-8000-00805f9b34fb").unwrap();

        let event = AdvertisementEvent {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: Some("Garmin Venu".to_string()),
            rssi: Some(-61),
            service_uuids: vec![uuid, uuid],
            manufacturer_data,
            local_name: Some("Venu".to_string()),
            tx_power: Some(4),
            received_at: OffsetDateTime::UNIX_EPOCH,
        };

        let record = DeviceRecord::from_event(&event);
        assert_eq!(record.address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(record.name, "Garmin Venu");
        assert_eq!(record.rssi, Some(-61));
        // Duplicates within one event are preserved, not deduplicated.
        assert_eq!(record.service_uuids.len(), 2);
        assert_eq!(record.local_name, "Venu");
        assert_eq!(record.tx_power, Some(4));

        let block = &record.manufacturer_data["0006"];
        assert_eq!(block.hex, "deadbeef");
        assert_eq!(block.length, 4);
        assert_eq!(record.category(), Category::Wearable);
    }

    #[test]
    fn test_manufacturer_block_empty_payload() {
        let block = ManufacturerBlock::from_bytes(&[]);
        assert_eq!(block.hex, "");
        assert_eq!(block.length, 0);
    }

    #[test]
    fn test_format_company_id_zero_pads() {
        assert_eq!(format_company_id(0), "0000");
        assert_eq!(format_company_id(6), "0006");
        assert_eq!(format_company_id(0x004C), "004C");
        assert_eq!(format_company_id(u16::MAX), "FFFF");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_record_json_round_trip() {
        let mut manufacturer_data = HashMap::new();
        manufacturer_data.insert(0x004Cu16, vec![0x02, 0x15]);
        let event = AdvertisementEvent {
            address: "11:22:33:44:55:66".to_string(),
            name: Some("Tile Beacon".to_string()),
            rssi: Some(-80),
            manufacturer_data,
            tx_power: Some(0),
            ..Default::default()
        };
        let record = DeviceRecord::from_event(&event);

        let json = serde_json::to_string(&record).unwrap();
        let back: DeviceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    proptest! {
        #[test]
        fn prop_company_id_is_four_uppercase_hex_digits(id in 0u16..=u16::MAX) {
            let rendered = format_company_id(id);
            prop_assert_eq!(rendered.len(), 4);
            prop_assert!(rendered
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }

        #[test]
        fn prop_company_id_is_injective(a in 0u16..=u16::MAX, b in 0u16..=u16::MAX) {
            if a != b {
                prop_assert_ne!(format_company_id(a), format_company_id(b));
            }
        }
    }
}
