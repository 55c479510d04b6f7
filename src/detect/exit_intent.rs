//! Exit Intent Detection
//!
//! Emits a candidate when the pointer leaves the viewport near the top
//! edge, heuristically indicating abandonment. Every qualifying exit
//! emits; the once-per-session guarantee is the arbiter's, enforced
//! through its session flag at dispatch, so an exit suppressed by an
//! active overlay can still fire on a later qualifying exit. Reading
//! progress at the moment of exit is derived from the latest scroll
//! sample.

use super::{CandidateIntent, Detector, IntentKind, IntentMetrics};
use crate::signal::types::{Sample, SamplePayload};
use crate::time::Timestamp;
use tracing::debug;

/// Exit intent thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ExitIntentConfig {
    /// Exit vertical coordinate must be within this many px of the top
    pub threshold_y: f64,
}

impl Default for ExitIntentConfig {
    fn default() -> Self {
        Self { threshold_y: 50.0 }
    }
}

/// Detects pointer trajectories leaving toward the top of the viewport.
pub struct ExitIntentDetector {
    config: ExitIntentConfig,
    /// Latest (offset, max_offset) seen on the scroll stream
    scroll: Option<(f64, f64)>,
}

impl ExitIntentDetector {
    pub fn new(config: ExitIntentConfig) -> Self {
        Self {
            config,
            scroll: None,
        }
    }

    /// Reading progress 0–100 from the latest scroll sample; 0 when the
    /// page has not scrolled or does not scroll.
    fn scroll_progress_percent(&self) -> f64 {
        match self.scroll {
            Some((offset, max_offset)) if max_offset > 0.0 => {
                (offset / max_offset * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

impl Detector for ExitIntentDetector {
    fn name(&self) -> &'static str {
        "exit_intent"
    }

    fn handle_sample(&mut self, sample: &Sample) -> Vec<CandidateIntent> {
        match sample.payload {
            SamplePayload::Scroll { offset, max_offset } => {
                self.scroll = Some((offset, max_offset));
                Vec::new()
            }
            SamplePayload::ExitTop { y } => {
                if y > self.config.threshold_y {
                    return Vec::new();
                }

                let progress = self.scroll_progress_percent();
                debug!(y, progress, "exit intent candidate");
                vec![CandidateIntent {
                    kind: IntentKind::ExitIntent,
                    target: None,
                    metrics: IntentMetrics::Exit {
                        scroll_progress_percent: progress,
                    },
                    timestamp: sample.timestamp,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, _now: Timestamp) -> Vec<CandidateIntent> {
        Vec::new()
    }
}
