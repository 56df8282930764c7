//! Mock advertisement source for testing.
//!
//! Emits a scripted sequence of events without requiring BLE hardware.
//! Supports start-failure injection, per-event latency, and a stop-call
//! counter so tests can assert the session's stop-exactly-once guarantee.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::source::AdvertisementSource;
use bletrace_types::AdvertisementEvent;

/// An [`AdvertisementSource`] that replays a scripted event sequence.
///
/// # Example
///
/// ```
/// use bletrace_core::mock::MockSource;
/// use bletrace_core::AdvertisementEvent;
///
/// let source = MockSource::new(vec![AdvertisementEvent {
///     address: "AA:BB".to_string(),
///     name: Some("Test Sensor".to_string()),
///     ..Default::default()
/// }]);
/// let stops = source.stop_calls();
/// assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 0);
/// ```
pub struct MockSource {
    events: Vec<AdvertisementEvent>,
    event_delay: Duration,
    fail_start: bool,
    /// Drop the sender once the script is exhausted, closing the channel.
    close_after_script: bool,
    stop_calls: Arc<AtomicUsize>,
    // Keeps the channel open after the script ends, modelling a quiet but
    // still-running backend.
    keepalive: Option<mpsc::Sender<AdvertisementEvent>>,
    emitter: Option<JoinHandle<()>>,
}

impl MockSource {
    /// Create a source that emits the given events in order.
    pub fn new(events: Vec<AdvertisementEvent>) -> Self {
        Self {
            events,
            event_delay: Duration::ZERO,
            fail_start: false,
            close_after_script: false,
            stop_calls: Arc::new(AtomicUsize::new(0)),
            keepalive: None,
            emitter: None,
        }
    }

    /// Delay between emitted events (tokio time, so paused-clock tests
    /// advance through it instantly).
    #[must_use]
    pub fn event_delay(mut self, delay: Duration) -> Self {
        self.event_delay = delay;
        self
    }

    /// Make `start` fail with [`Error::ScanStartFailed`].
    #[must_use]
    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Close the event channel after the last scripted event, simulating a
    /// backend that dies mid-session.
    #[must_use]
    pub fn close_after_script(mut self) -> Self {
        self.close_after_script = true;
        self
    }

    /// Counter of how many times `stop` has been called.
    pub fn stop_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stop_calls)
    }
}

#[async_trait]
impl AdvertisementSource for MockSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AdvertisementEvent>> {
        if self.fail_start {
            return Err(Error::scan_start_failed("mock start failure"));
        }

        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        if !self.close_after_script {
            self.keepalive = Some(tx.clone());
        }

        let events = std::mem::take(&mut self.events);
        let delay = self.event_delay;
        self.emitter = Some(tokio::spawn(async move {
            for event in events {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.emitter.take() {
            handle.abort();
        }
        self.keepalive.take();
        Ok(())
    }
}

/// A source whose `stop` always fails, for exercising the best-effort
/// stop path.
pub struct FailingStopSource {
    inner: MockSource,
}

impl FailingStopSource {
    /// Wrap a mock source.
    pub fn new(inner: MockSource) -> Self {
        Self { inner }
    }

    /// Counter of how many times `stop` has been called.
    pub fn stop_calls(&self) -> Arc<AtomicUsize> {
        self.inner.stop_calls()
    }
}

#[async_trait]
impl AdvertisementSource for FailingStopSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AdvertisementEvent>> {
        self.inner.start().await
    }

    async fn stop(&mut self) -> Result<()> {
        self.inner.stop().await?;
        Err(Error::Io(io::Error::other("mock stop failure")))
    }
}
