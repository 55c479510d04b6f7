//! Behavioral detectors
//!
//! Four independent, stateful detectors consume samples from the sampler
//! and emit candidate intents when their threshold conditions are met.
//! They share no behavior, only the [`Detector`] calling convention; each
//! exclusively owns its own state, including every timer it arms.

pub mod cursor_hesitation;
pub mod exit_intent;
pub mod hover_dwell;
pub mod scroll_dynamics;

pub use cursor_hesitation::CursorHesitationDetector;
pub use exit_intent::ExitIntentDetector;
pub use hover_dwell::HoverDwellDetector;
pub use scroll_dynamics::ScrollDynamicsDetector;

use crate::signal::types::{Sample, TargetInfo};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Discrete intent classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Sustained hover on one content element
    HoverDwell,
    /// Repeated fast scrolling within a short window
    RapidSkim,
    /// Downward scroll reversed shortly after, indicating re-reading
    ScrollBack,
    /// Pointer still within a small region for a sustained period
    CursorHesitation,
    /// Pointer trajectory leaving toward the top of the viewport
    ExitIntent,
}

/// How an intervention for this intent is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationCategory {
    /// Inline artifact (highlight); exempt from overlay exclusion
    Inline,
    /// Non-inline artifact (box, bubble, modal, sidebar); mutually exclusive
    Overlay,
}

impl IntentKind {
    /// Stable identifier used in telemetry event types.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::HoverDwell => "hover_dwell",
            IntentKind::RapidSkim => "rapid_skim",
            IntentKind::ScrollBack => "scroll_back",
            IntentKind::CursorHesitation => "cursor_hesitation",
            IntentKind::ExitIntent => "exit_intent",
        }
    }

    /// Presentation category for arbitration. Hover highlights are inline;
    /// every other intervention is an overlay.
    pub fn category(&self) -> PresentationCategory {
        match self {
            IntentKind::HoverDwell => PresentationCategory::Inline,
            _ => PresentationCategory::Overlay,
        }
    }
}

/// Detector-reported measurements attached to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentMetrics {
    Dwell {
        /// Length of the dwelled element's text
        target_text_len: usize,
        /// Configured dwell delay that elapsed
        dwell_ms: u64,
    },
    Skim {
        /// Qualifying fast-scroll samples in the window at fire time
        samples_in_window: usize,
        /// Fastest instantaneous speed observed among them (px/s)
        peak_speed: f64,
    },
    ScrollBack {
        /// Total descent before the reversal (px)
        descent_px: f64,
        /// Time from descent start to reversal (ms)
        descent_ms: u64,
    },
    Hesitation {
        /// Centroid of the position buffer
        centroid_x: f64,
        centroid_y: f64,
        /// Mean squared distance from the centroid (px²)
        variance: f64,
    },
    Exit {
        /// Reading progress at exit, 0–100
        scroll_progress_percent: f64,
    },
}

/// A candidate intent emitted by a detector, pending arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateIntent {
    /// Classified intent
    pub kind: IntentKind,
    /// Element the intent is bound to, when element-scoped
    pub target: Option<TargetInfo>,
    /// Detector measurements
    pub metrics: IntentMetrics,
    /// Time the condition was met
    pub timestamp: Timestamp,
}

/// Uniform detector capability.
///
/// `handle_sample` runs synchronously inside the sample callback;
/// `tick` drives deferred evaluation (armed deadlines, periodic checks).
/// Both complete without suspension and never fail: signal noise is
/// absorbed by thresholds, not surfaced.
pub trait Detector {
    /// Detector name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Consume an accepted sample, possibly emitting candidates.
    fn handle_sample(&mut self, sample: &Sample) -> Vec<CandidateIntent>;

    /// Advance detector time, firing any due deadlines.
    fn tick(&mut self, now: Timestamp) -> Vec<CandidateIntent>;
}
