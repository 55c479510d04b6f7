//! Session Traces
//!
//! Serialization format for captured interaction sessions: the raw event
//! stream plus a snapshot of the page it was captured on. Traces make a
//! session replayable long after the page is gone.

use crate::signal::types::RawEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Current trace format version
pub const TRACE_FORMAT_VERSION: &str = "1.0";

/// Trace metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Unique trace ID
    pub id: Uuid,
    /// Trace name
    pub name: String,
    /// Capture time
    pub captured_at: DateTime<Utc>,
    /// Total event count
    pub event_count: usize,
    /// Engine-timeline span of the capture (ms)
    pub duration_ms: u64,
    /// Trace format version
    pub format_version: String,
}

impl TraceMetadata {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            captured_at: Utc::now(),
            event_count: 0,
            duration_ms: 0,
            format_version: TRACE_FORMAT_VERSION.to_string(),
        }
    }
}

/// Captured page context for replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Page URL at capture time
    pub url: String,
    /// Visible text at capture time
    pub text: String,
}

/// A complete captured session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Trace metadata
    pub metadata: TraceMetadata,
    /// Page context
    pub page: PageSnapshot,
    /// Raw events, in capture order
    pub events: Vec<RawEvent>,
}

impl Trace {
    /// Create an empty trace for a page.
    pub fn new(name: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            metadata: TraceMetadata::new(name.into()),
            page: PageSnapshot {
                url: url.into(),
                text: text.into(),
            },
            events: Vec::new(),
        }
    }

    /// Append an event.
    pub fn add_event(&mut self, event: RawEvent) {
        self.events.push(event);
    }

    /// Refresh metadata counters from the event stream.
    pub fn finalize(&mut self) {
        self.metadata.event_count = self.events.len();
        self.metadata.duration_ms = match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last
                .timestamp
                .duration_since(first.timestamp)
                .as_millis(),
            _ => 0,
        };
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and sanity-check a trace file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let trace: Self = serde_json::from_str(&content)?;

        if trace.metadata.format_version != TRACE_FORMAT_VERSION {
            return Err(crate::Error::Trace(format!(
                "unsupported trace format version: {}",
                trace.metadata.format_version
            )));
        }
        // Replay requires a monotone timeline
        let ordered = trace
            .events
            .windows(2)
            .all(|w| !w[0].timestamp.is_after(w[1].timestamp));
        if !ordered {
            return Err(crate::Error::Trace(
                "trace events are not in timestamp order".to_string(),
            ));
        }
        Ok(trace)
    }
}
