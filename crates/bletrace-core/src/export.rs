//! Registry summary and durable export.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::registry::DeviceRegistry;
use bletrace_types::{Category, DeviceRecord};

/// End-of-session totals.
///
/// Categories with zero devices are omitted from `categories` rather than
/// shown as zero, matching the summary output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Total number of distinct devices seen.
    pub total: usize,
    /// Device count per category; only categories that were seen.
    pub categories: BTreeMap<Category, usize>,
}

impl Summary {
    /// Compute the summary of a registry snapshot.
    #[must_use]
    pub fn of(registry: &DeviceRegistry) -> Self {
        let mut categories = BTreeMap::new();
        for record in registry.records() {
            *categories.entry(record.category()).or_insert(0) += 1;
        }
        Self {
            total: registry.len(),
            categories,
        }
    }
}

/// Export a registry snapshot as a JSON document mapping address to record.
///
/// The document is written to a temporary sibling first and atomically
/// renamed over the destination, so a failure never corrupts a previously
/// successful export at the same path.
///
/// # Errors
///
/// Returns [`Error::ExportFailed`] when the destination cannot be written;
/// the failure names the path and the underlying reason.
pub fn export_registry(registry: &DeviceRegistry, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&registry.as_sorted_map())
        .map_err(|e| Error::export_failed(path, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::export_failed(path, e))?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| Error::export_failed(path, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        // Leave the destination untouched; clean up the temporary.
        let _ = fs::remove_file(&tmp);
        return Err(Error::export_failed(path, e));
    }

    info!(
        "exported {} device(s) to {}",
        registry.len(),
        path.display()
    );
    Ok(())
}

/// Read a previously exported registry back in.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::InvalidData`] when it does not parse as an export document.
pub fn import_registry(path: &Path) -> Result<DeviceRegistry> {
    let content = fs::read_to_string(path)?;
    let records: BTreeMap<String, DeviceRecord> =
        serde_json::from_str(&content).map_err(|e| Error::InvalidData(e.to_string()))?;
    Ok(DeviceRegistry::from_records(records.into_values()))
}
