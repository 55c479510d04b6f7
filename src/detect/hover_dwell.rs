//! Hover-Dwell Detection
//!
//! Sustained hover on a single content element past the dwell delay.
//! State machine: `idle → armed → fired`. Arming schedules the dwell
//! deadline; leaving the element, or any scroll, cancels it in the same
//! transition. A full leave/re-enter cycle after firing re-arms normally:
//! dwell is not deduped, re-hovering means the element is interesting
//! again.

use super::{CandidateIntent, Detector, IntentKind, IntentMetrics};
use crate::signal::types::{Sample, SamplePayload, TargetInfo};
use crate::time::{Deadline, Duration, Timestamp};
use tracing::debug;

/// Hover-dwell thresholds.
#[derive(Debug, Clone, Copy)]
pub struct HoverDwellConfig {
    /// Continuous hover required before firing
    pub dwell_delay: Duration,
    /// Minimum rendered area for a qualifying element (px²)
    pub min_target_area: f64,
}

impl Default for HoverDwellConfig {
    fn default() -> Self {
        Self {
            dwell_delay: Duration::from_millis(1_500),
            min_target_area: 1_600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DwellPhase {
    Idle,
    Armed,
    Fired,
}

/// Detects sustained hover on qualifying content elements.
pub struct HoverDwellDetector {
    config: HoverDwellConfig,
    phase: DwellPhase,
    target: Option<TargetInfo>,
    dwell_timer: Deadline,
}

impl HoverDwellDetector {
    pub fn new(config: HoverDwellConfig) -> Self {
        Self {
            config,
            phase: DwellPhase::Idle,
            target: None,
            dwell_timer: Deadline::new("hover-dwell"),
        }
    }

    /// Chrome elements and tiny targets (icons, controls) never dwell.
    fn qualifies(&self, target: &TargetInfo) -> bool {
        target.region.is_content() && target.area() >= self.config.min_target_area
    }

    /// Cancel the pending dwell and drop the tracked target.
    fn reset(&mut self) {
        self.dwell_timer.cancel();
        self.phase = DwellPhase::Idle;
        self.target = None;
    }
}

impl Detector for HoverDwellDetector {
    fn name(&self) -> &'static str {
        "hover_dwell"
    }

    fn handle_sample(&mut self, sample: &Sample) -> Vec<CandidateIntent> {
        match sample.payload {
            SamplePayload::Hover { target } => {
                if !self.qualifies(&target) {
                    return Vec::new();
                }
                if self.target.map(|t| t.id) == Some(target.id) {
                    // Re-enter of the tracked element (e.g. moving across
                    // children); the pending dwell keeps running.
                    return Vec::new();
                }
                // New qualifying target replaces any tracked one
                self.dwell_timer.cancel();
                self.target = Some(target);
                self.phase = DwellPhase::Armed;
                self.dwell_timer.arm(sample.timestamp, self.config.dwell_delay);
                debug!(target = target.id.0, "dwell armed");
            }
            SamplePayload::HoverEnd { target } => {
                if self.target.map(|t| t.id) == Some(target) {
                    self.reset();
                }
            }
            SamplePayload::Scroll { .. } => {
                // Scrolling moves content under the pointer; a dwell that
                // survives it would bind to the wrong element.
                if self.phase != DwellPhase::Idle {
                    self.reset();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn tick(&mut self, now: Timestamp) -> Vec<CandidateIntent> {
        if self.phase != DwellPhase::Armed || !self.dwell_timer.expire(now) {
            return Vec::new();
        }
        let Some(target) = self.target else {
            // Timer outlived its target: treat as cancelled
            self.phase = DwellPhase::Idle;
            return Vec::new();
        };

        self.phase = DwellPhase::Fired;
        debug!(target = target.id.0, "dwell fired");
        vec![CandidateIntent {
            kind: IntentKind::HoverDwell,
            target: Some(target),
            metrics: IntentMetrics::Dwell {
                target_text_len: target.text_len,
                dwell_ms: self.config.dwell_delay.as_millis(),
            },
            timestamp: now,
        }]
    }
}
