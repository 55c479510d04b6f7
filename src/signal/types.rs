//! Core types for signal intake
//!
//! Defines the raw host events and the normalized samples that flow
//! through the detection pipeline.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Opaque handle to a page element, assigned by the host.
///
/// The engine never holds live page references; the host maps ids back to
/// elements at the presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Page region an element belongs to.
///
/// Only `Content` targets qualify for hover dwell; the rest are page
/// chrome excluded from dwell detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRegion {
    Content,
    Navigation,
    Header,
    Footer,
    Chrome,
}

impl TargetRegion {
    /// Check if elements in this region may receive dwell interventions.
    pub fn is_content(&self) -> bool {
        matches!(self, TargetRegion::Content)
    }
}

/// Geometry and classification of a hoverable element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Host-assigned element handle
    pub id: TargetId,
    /// Rendered width in pixels
    pub width: f64,
    /// Rendered height in pixels
    pub height: f64,
    /// Page region classification
    pub region: TargetRegion,
    /// Length of the element's text content
    pub text_len: usize,
}

impl TargetInfo {
    /// Rendered area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Kinds of normalized samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    PointerMove,
    Scroll,
    HoverEnter,
    HoverLeave,
    PointerExitTop,
}

/// Kind-specific sample data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SamplePayload {
    /// Pointer position in viewport coordinates
    Pointer { x: f64, y: f64 },
    /// Vertical scroll offset and the maximum scrollable offset
    Scroll { offset: f64, max_offset: f64 },
    /// Pointer entered a tracked element
    Hover { target: TargetInfo },
    /// Pointer left a tracked element (or the element detached)
    HoverEnd { target: TargetId },
    /// Pointer left the viewport toward the top edge, at vertical `y`
    ExitTop { y: f64 },
}

impl SamplePayload {
    /// The sample kind this payload belongs to.
    pub fn kind(&self) -> SampleKind {
        match self {
            SamplePayload::Pointer { .. } => SampleKind::PointerMove,
            SamplePayload::Scroll { .. } => SampleKind::Scroll,
            SamplePayload::Hover { .. } => SampleKind::HoverEnter,
            SamplePayload::HoverEnd { .. } => SampleKind::HoverLeave,
            SamplePayload::ExitTop { .. } => SampleKind::PointerExitTop,
        }
    }
}

/// Raw interaction event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Engine-timeline timestamp
    pub timestamp: Timestamp,
    /// Event data
    pub payload: SamplePayload,
}

impl RawEvent {
    /// Create a pointer-move event.
    pub fn pointer_move(timestamp: Timestamp, x: f64, y: f64) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::Pointer { x, y },
        }
    }

    /// Create a scroll event.
    pub fn scroll(timestamp: Timestamp, offset: f64, max_offset: f64) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::Scroll { offset, max_offset },
        }
    }

    /// Create a hover-enter event.
    pub fn hover_enter(timestamp: Timestamp, target: TargetInfo) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::Hover { target },
        }
    }

    /// Create a hover-leave event.
    pub fn hover_leave(timestamp: Timestamp, target: TargetId) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::HoverEnd { target },
        }
    }

    /// Create a pointer-exit-toward-top event.
    pub fn pointer_exit_top(timestamp: Timestamp, y: f64) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::ExitTop { y },
        }
    }

    /// The sample kind this event normalizes to.
    pub fn kind(&self) -> SampleKind {
        self.payload.kind()
    }
}

/// Normalized sample produced by the sampler, consumed by detectors.
///
/// Samples are transient: each detector reads them during its callback and
/// retains at most a copy of what it needs in its own window state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Engine-timeline timestamp
    pub timestamp: Timestamp,
    /// Sample kind
    pub kind: SampleKind,
    /// Kind-specific data
    pub payload: SamplePayload,
}

impl Sample {
    /// Normalize an accepted raw event.
    pub fn from_event(event: &RawEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            kind: event.kind(),
            payload: event.payload,
        }
    }
}
