//! The device registry: one record per address, most recent advertisement
//! wins.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use bletrace_types::{AdvertisementEvent, DeviceRecord};

/// Per-address device records accumulated over one scan session.
///
/// The registry has exactly one writer, the session loop that owns it; it
/// grows monotonically (no eviction) and holds at most one record per
/// address. An event for a known address replaces the whole record, so each
/// record reflects a single advertisement.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceRecord>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully overwrite the record for the event's address.
    ///
    /// Returns the record now stored for that address.
    pub fn upsert(&mut self, event: &AdvertisementEvent) -> &DeviceRecord {
        let record = DeviceRecord::from_event(event);
        match self.devices.entry(event.address.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(record);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(record),
        }
    }

    /// Look up the record for an address.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&DeviceRecord> {
        self.devices.get(address)
    }

    /// Number of distinct devices seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no devices have been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over all records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }

    /// Address-ordered view of the registry, as used by the export format.
    #[must_use]
    pub fn as_sorted_map(&self) -> BTreeMap<&str, &DeviceRecord> {
        self.devices
            .iter()
            .map(|(addr, record)| (addr.as_str(), record))
            .collect()
    }

    /// Rebuild a registry from previously exported records.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = DeviceRecord>) -> Self {
        Self {
            devices: records
                .into_iter()
                .map(|r| (r.address.clone(), r))
                .collect(),
        }
    }
}
