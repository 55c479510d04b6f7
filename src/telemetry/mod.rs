//! Telemetry Sink
//!
//! Fire-and-forget recording of arbitration decisions. Delivery failures
//! are logged for debugging and otherwise ignored: no retry, no
//! backpressure, and never an error surfaced to the engine.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A recorded decision, in the analytics wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Event identifier, e.g. `rapid_skim_fired`, `exit_intent_suppressed`
    pub event_type: String,
    /// Host page domain
    pub domain: String,
    /// Wall-clock time of the decision
    pub timestamp: DateTime<Utc>,
    /// Kind-specific measurements
    pub metadata: serde_json::Value,
}

impl TelemetryEvent {
    pub fn new(
        event_type: impl Into<String>,
        domain: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            domain: domain.into(),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// Decision recording contract.
pub trait TelemetrySink {
    /// Record an event. Must not block and must not fail.
    fn record(&self, event: TelemetryEvent);
}

/// Sink that drops everything.
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Sink that buffers events in memory, for tests and replay summaries.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: TelemetryEvent) {
        debug!(event_type = %event.event_type, "telemetry recorded");
        self.events.lock().push(event);
    }
}

impl TelemetrySink for &MemorySink {
    fn record(&self, event: TelemetryEvent) {
        (*self).record(event);
    }
}

/// Sink that posts each event to the analytics endpoint on a spawned
/// task. Requires a tokio runtime; without one, events are dropped with
/// a warning.
pub struct HttpTelemetrySink {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTelemetrySink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl TelemetrySink for HttpTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(event_type = %event.event_type, "telemetry dropped: no async runtime");
            return;
        };

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        handle.spawn(async move {
            match client.post(&endpoint).json(&event).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    warn!(status = %resp.status(), "telemetry delivery rejected");
                }
                Err(e) => {
                    warn!("telemetry delivery failed: {e}");
                }
            }
        });
    }
}
