//! The bounded-lifetime scan session.
//!
//! A session starts an [`AdvertisementSource`], consumes its events one at a
//! time into a fresh [`DeviceRegistry`], and terminates exactly once: on
//! timeout, on cooperative cancellation, or when the backend dies. All exit
//! paths share the same stop logic, and the registry is handed off read-only
//! in the resulting [`SessionReport`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::registry::DeviceRegistry;
use crate::source::AdvertisementSource;
use bletrace_types::{AdvertisementEvent, DeviceRecord};

/// Options for a scan session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Upper bound on how long the session listens.
    pub duration: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30),
        }
    }
}

impl SessionOptions {
    /// Create new session options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen window.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the listen window in seconds.
    #[must_use]
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration = Duration::from_secs(secs);
        self
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured duration elapsed.
    Timeout,
    /// A cancellation signal was observed. Not an error; the registry
    /// accumulated so far is kept.
    UserCancelled,
    /// The event stream closed before the session ended.
    Error,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::UserCancelled => write!(f, "cancelled by user"),
            Self::Error => write!(f, "event stream error"),
        }
    }
}

/// The read-only outcome of a completed session.
#[derive(Debug)]
pub struct SessionReport {
    /// The registry accumulated during the session. Not mutated after
    /// `ended_at`.
    pub registry: DeviceRegistry,
    /// When the listen window opened.
    pub started_at: OffsetDateTime,
    /// When the session terminated.
    pub ended_at: OffsetDateTime,
    /// Which exit path ended the session.
    pub stop_reason: StopReason,
    /// How many advertisement events were processed.
    pub events_processed: usize,
}

/// Run one scan session to completion.
///
/// The source is started before the duration timer begins. Events are
/// processed strictly in arrival order, one at a time: each is upserted into
/// the registry and then handed to `on_event` together with the record it
/// produced, which is where live per-device output hooks in.
///
/// The session ends on whichever comes first of the duration elapsing, the
/// cancellation token firing, or the event channel closing; `source.stop()`
/// is invoked exactly once in every case. A stop failure is logged and does
/// not affect the result. Cancellation is not an error: the report carries
/// [`StopReason::UserCancelled`] and whatever registry was accumulated.
///
/// # Errors
///
/// Returns an error only when the source fails to start
/// ([`crate::Error::ScanStartFailed`]); no report or partial registry is
/// produced in that case.
pub async fn run_session<S, F>(
    mut source: S,
    options: SessionOptions,
    cancel: CancellationToken,
    mut on_event: F,
) -> Result<SessionReport>
where
    S: AdvertisementSource,
    F: FnMut(&AdvertisementEvent, &DeviceRecord),
{
    let mut events = source.start().await?;
    let started_at = OffsetDateTime::now_utc();
    info!(
        "scan session started ({}s window)",
        options.duration.as_secs()
    );

    let mut registry = DeviceRegistry::new();
    let mut events_processed = 0usize;

    let deadline = tokio::time::sleep(options.duration);
    tokio::pin!(deadline);

    let stop_reason = loop {
        tokio::select! {
            _ = &mut deadline => {
                break StopReason::Timeout;
            }
            _ = cancel.cancelled() => {
                info!("scan session cancelled");
                break StopReason::UserCancelled;
            }
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(event) => {
                        debug!("advertisement from {}", event.address);
                        let record = registry.upsert(&event);
                        on_event(&event, record);
                        events_processed += 1;
                    }
                    None => {
                        warn!("event stream closed before session end");
                        break StopReason::Error;
                    }
                }
            }
        }
    };

    // Single stop path for every exit; best-effort.
    if let Err(e) = source.stop().await {
        warn!("failed to stop scan cleanly: {}", e);
    }

    let ended_at = OffsetDateTime::now_utc();
    info!(
        "scan session ended ({}): {} device(s), {} event(s)",
        stop_reason,
        registry.len(),
        events_processed
    );

    Ok(SessionReport {
        registry,
        started_at,
        ended_at,
        stop_reason,
        events_processed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_builder() {
        let opts = SessionOptions::new().duration_secs(8);
        assert_eq!(opts.duration, Duration::from_secs(8));

        let opts = SessionOptions::default();
        assert_eq!(opts.duration, Duration::from_secs(30));
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::Timeout.to_string(), "timeout");
        assert_eq!(StopReason::UserCancelled.to_string(), "cancelled by user");
        assert_eq!(StopReason::Error.to_string(), "event stream error");
    }

    #[test]
    fn test_stop_reason_serde() {
        let json = serde_json::to_string(&StopReason::UserCancelled).unwrap();
        assert_eq!(json, "\"user_cancelled\"");
        let back: StopReason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StopReason::UserCancelled);
    }
}
