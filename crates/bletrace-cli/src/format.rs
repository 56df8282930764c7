//! Output formatting: live event blocks, summary tables, JSON reports.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use bletrace_core::{DeviceRegistry, SessionReport, Summary};
use bletrace_types::DeviceRecord;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Formatting options shared by text renderers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Strip all color codes (for scripting or config preference).
    pub no_color: bool,
}

const CLOCK: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// How many service UUIDs to list before truncating with a count.
const SERVICE_PREVIEW: usize = 3;

/// Render one live per-event block: timestamp, name, address, RSSI, and any
/// manufacturer data and service UUIDs (first three, then a "+N more" note).
#[must_use]
pub fn format_event_block(record: &DeviceRecord, opts: &FormatOptions) -> String {
    let clock = record
        .timestamp
        .format(&CLOCK)
        .unwrap_or_else(|_| "--:--:--".to_string());

    let name = if opts.no_color {
        record.name.clone()
    } else {
        format!("{}", record.name.cyan())
    };

    let rssi = record
        .rssi
        .map(|r| format!("{} dBm", r))
        .unwrap_or_else(|| "N/A".to_string());

    let mut out = format!("[{}] {} - {}\n  RSSI: {}\n", clock, name, record.address, rssi);

    if !record.manufacturer_data.is_empty() {
        out.push_str("  Manufacturer Data:\n");
        for (company_id, block) in &record.manufacturer_data {
            out.push_str(&format!("    {}: {}\n", company_id, block.hex));
        }
    }

    if !record.service_uuids.is_empty() {
        let preview: Vec<&str> = record
            .service_uuids
            .iter()
            .take(SERVICE_PREVIEW)
            .map(String::as_str)
            .collect();
        out.push_str(&format!("  Services: {}\n", preview.join(", ")));
        if record.service_uuids.len() > SERVICE_PREVIEW {
            out.push_str(&format!(
                "    ... and {} more\n",
                record.service_uuids.len() - SERVICE_PREVIEW
            ));
        }
    }

    out
}

/// Format RSSI as a visual signal bar.
/// RSSI typically ranges from -100 dBm (weak) to -30 dBm (strong).
#[must_use]
pub fn format_signal_bar(rssi: Option<i16>, no_color: bool) -> String {
    let rssi = match rssi {
        Some(r) => r,
        None => return "N/A".to_string(),
    };

    let strength = ((rssi + 100).clamp(0, 70) as f32 / 7.0).round() as usize;
    let filled = strength.min(10);
    let empty = 10 - filled;

    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));

    if no_color {
        format!("{} {:>4}", bar, rssi)
    } else if filled >= 7 {
        format!("{} {:>4}", bar.green(), rssi)
    } else if filled >= 4 {
        format!("{} {:>4}", bar.yellow(), rssi)
    } else {
        format!("{} {:>4}", bar.red(), rssi)
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Address")]
    address: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Render the end-of-run summary: device table plus count-per-category
/// table. Categories with zero devices are omitted.
#[must_use]
pub fn format_summary_text(registry: &DeviceRegistry, opts: &FormatOptions) -> String {
    if registry.is_empty() {
        return "No BLE devices found.\n".to_string();
    }

    let summary = Summary::of(registry);

    let count_display = if opts.no_color {
        summary.total.to_string()
    } else {
        format!("{}", summary.total.to_string().green().bold())
    };
    let mut output = format!("Found {} BLE device(s)\n\n", count_display);

    let mut rows: Vec<DeviceRow> = registry
        .records()
        .map(|r| DeviceRow {
            name: if opts.no_color {
                r.name.clone()
            } else {
                format!("{}", r.name.cyan())
            },
            category: r.category().to_string(),
            signal: format_signal_bar(r.rssi, opts.no_color),
            address: r.address.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.address.cmp(&b.address));

    let mut devices = Table::new(rows);
    devices.with(Style::rounded());
    output.push_str(&format!("{}\n\n", devices));

    let category_rows: Vec<CategoryRow> = summary
        .categories
        .iter()
        .map(|(category, count)| CategoryRow {
            category: category.to_string(),
            count: *count,
        })
        .collect();

    let mut categories = Table::new(category_rows);
    categories.with(Style::rounded());
    output.push_str(&format!("Device types:\n{}\n", categories));

    output
}

/// Render a completed session report as a JSON document.
pub fn format_report_json(report: &SessionReport) -> Result<String> {
    #[derive(Serialize)]
    struct ReportJson<'a> {
        #[serde(with = "time::serde::rfc3339")]
        started_at: time::OffsetDateTime,
        #[serde(with = "time::serde::rfc3339")]
        ended_at: time::OffsetDateTime,
        stop_reason: bletrace_core::StopReason,
        events_processed: usize,
        summary: Summary,
        devices: std::collections::BTreeMap<&'a str, &'a DeviceRecord>,
    }

    let json = serde_json::to_string_pretty(&ReportJson {
        started_at: report.started_at,
        ended_at: report.ended_at,
        stop_reason: report.stop_reason,
        events_processed: report.events_processed,
        summary: Summary::of(&report.registry),
        devices: report.registry.as_sorted_map(),
    })?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bletrace_types::AdvertisementEvent;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn plain() -> FormatOptions {
        FormatOptions { no_color: true }
    }

    fn record(name: Option<&str>, services: usize) -> DeviceRecord {
        let uuid = Uuid::parse_str("0000180f-0000-1000-8000-00805f9b34fb").unwrap();
        let mut manufacturer_data = HashMap::new();
        manufacturer_data.insert(6u16, vec![0xAB, 0xCD]);
        DeviceRecord::from_event(&AdvertisementEvent {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: name.map(str::to_string),
            rssi: Some(-55),
            service_uuids: vec![uuid; services],
            manufacturer_data,
            ..Default::default()
        })
    }

    #[test]
    fn test_event_block_contains_all_fields() {
        let block = format_event_block(&record(Some("iPhone 12"), 2), &plain());
        assert!(block.contains("iPhone 12 - AA:BB:CC:DD:EE:FF"));
        assert!(block.contains("RSSI: -55 dBm"));
        assert!(block.contains("0006: abcd"));
        assert!(block.contains("Services: "));
        assert!(!block.contains("more"));
    }

    #[test]
    fn test_event_block_truncates_services() {
        let block = format_event_block(&record(Some("Hub"), 5), &plain());
        assert!(block.contains("... and 2 more"));
        // Only the first three are listed.
        assert_eq!(block.matches("0000180f").count(), 3);
    }

    #[test]
    fn test_event_block_unknown_name() {
        let block = format_event_block(&record(None, 0), &plain());
        assert!(block.contains("Unknown - AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_signal_bar_plain() {
        assert_eq!(format_signal_bar(None, true), "N/A");
        let strong = format_signal_bar(Some(-30), true);
        assert!(strong.starts_with("██████████"));
        let weak = format_signal_bar(Some(-100), true);
        assert!(weak.starts_with("░░░░░░░░░░"));
    }

    #[test]
    fn test_summary_empty_registry() {
        let registry = DeviceRegistry::new();
        assert_eq!(format_summary_text(&registry, &plain()), "No BLE devices found.\n");
    }

    #[test]
    fn test_summary_lists_categories() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(&AdvertisementEvent {
            address: "AA".to_string(),
            name: Some("iPhone 12".to_string()),
            rssi: Some(-50),
            ..Default::default()
        });
        registry.upsert(&AdvertisementEvent {
            address: "BB".to_string(),
            name: Some("Fitbit Versa".to_string()),
            rssi: Some(-70),
            ..Default::default()
        });

        let text = format_summary_text(&registry, &plain());
        assert!(text.contains("Found 2 BLE device(s)"));
        assert!(text.contains("Phone"));
        assert!(text.contains("Wearable"));
        // Zero-count categories don't appear.
        assert!(!text.contains("Audio"));
    }
}
