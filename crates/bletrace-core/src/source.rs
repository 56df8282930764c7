//! Advertisement sources.
//!
//! A scan session consumes [`AdvertisementEvent`]s from an
//! [`AdvertisementSource`] rather than talking to the Bluetooth stack
//! directly. The production implementation wraps a btleplug adapter; tests
//! use [`crate::mock::MockSource`].
//!
//! Whatever threading the platform stack uses for its callbacks, events
//! reach the session through a single bounded mpsc channel, so registry
//! mutations are serialized by construction.

use async_trait::async_trait;
use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use futures::StreamExt;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use bletrace_types::AdvertisementEvent;

/// Default capacity of the event channel between the backend and the
/// session loop.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A stream of BLE advertisement observations.
///
/// `start` must be called before `stop`; the session guarantees `stop` is
/// invoked exactly once per run, on every exit path.
#[async_trait]
pub trait AdvertisementSource: Send {
    /// Start delivering advertisement events.
    ///
    /// Returns the receiving end of the event channel. A failure here is
    /// fatal to the session.
    async fn start(&mut self) -> Result<mpsc::Receiver<AdvertisementEvent>>;

    /// Stop delivering events and release the backend.
    ///
    /// Stopping is best-effort from the session's point of view: a failure
    /// is logged, not propagated.
    async fn stop(&mut self) -> Result<()>;
}

/// Get the first available Bluetooth adapter.
pub async fn get_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters.into_iter().next().ok_or(Error::NoAdapter)
}

/// Format a peripheral ID as a bare string.
///
/// On macOS, peripheral IDs are UUIDs; elsewhere they wrap the address.
fn format_peripheral_id(id: &PeripheralId) -> String {
    format!("{:?}", id)
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Pick a stable identifier for a peripheral.
///
/// macOS reports addresses as 00:00:00:00:00:00; there the peripheral ID is
/// the only usable key. Other platforms use the Bluetooth address.
fn peripheral_identifier(address: &str, id: &PeripheralId) -> String {
    if address == "00:00:00:00:00:00" {
        format_peripheral_id(id)
    } else {
        address.to_string()
    }
}

/// Production source backed by a btleplug adapter.
///
/// `start` begins the platform scan and spawns a forwarder task that turns
/// the adapter's event stream into [`AdvertisementEvent`]s. Each
/// advertisement-bearing event triggers a fresh read of the peripheral's
/// merged properties, so the emitted event always carries the most recent
/// view the stack has.
pub struct BtleplugSource {
    adapter: Adapter,
    channel_capacity: usize,
    forwarder: Option<JoinHandle<()>>,
}

impl BtleplugSource {
    /// Create a source over the given adapter.
    pub fn new(adapter: Adapter) -> Self {
        Self {
            adapter,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            forwarder: None,
        }
    }

    /// Override the event channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Build an advertisement event from a peripheral's current properties.
    ///
    /// Any field the stack does not report is defaulted; a partial
    /// advertisement never aborts the scan.
    async fn event_for_peripheral(adapter: &Adapter, id: &PeripheralId) -> Option<AdvertisementEvent> {
        let peripheral = match adapter.peripheral(id).await {
            Ok(p) => p,
            Err(e) => {
                trace!("peripheral {} not available: {}", format_peripheral_id(id), e);
                return None;
            }
        };

        let props = match peripheral.properties().await {
            Ok(Some(props)) => props,
            Ok(None) => return None,
            Err(e) => {
                debug!("failed to read properties for {}: {}", format_peripheral_id(id), e);
                return None;
            }
        };

        let address = peripheral_identifier(&props.address.to_string(), id);

        Some(AdvertisementEvent {
            address,
            name: props.local_name.clone(),
            rssi: props.rssi,
            service_uuids: props.services.clone(),
            manufacturer_data: props.manufacturer_data.clone(),
            local_name: props.local_name,
            tx_power: props.tx_power_level,
            received_at: OffsetDateTime::now_utc(),
        })
    }
}

#[async_trait]
impl AdvertisementSource for BtleplugSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AdvertisementEvent>> {
        let mut events = self
            .adapter
            .events()
            .await
            .map_err(|e| Error::scan_start_failed(e.to_string()))?;

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| Error::scan_start_failed(e.to_string()))?;

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let adapter = self.adapter.clone();

        self.forwarder = Some(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let id = match &event {
                    CentralEvent::DeviceDiscovered(id)
                    | CentralEvent::DeviceUpdated(id)
                    | CentralEvent::ManufacturerDataAdvertisement { id, .. }
                    | CentralEvent::ServiceDataAdvertisement { id, .. }
                    | CentralEvent::ServicesAdvertisement { id, .. } => id.clone(),
                    _ => continue,
                };

                if let Some(adv) = Self::event_for_peripheral(&adapter, &id).await {
                    if tx.send(adv).await.is_err() {
                        // Session is gone; nothing left to forward to.
                        break;
                    }
                }
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(handle) = self.forwarder.take() {
            handle.abort();
        }
        self.adapter.stop_scan().await?;
        Ok(())
    }
}
