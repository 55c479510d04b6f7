//! Scroll Dynamics Detection
//!
//! Two independent sub-behaviors over the accepted scroll stream:
//!
//! - **Rapid skim**: per-sample deltas at or above the skim threshold are
//!   collected in a sliding window; reaching the trigger count fires and
//!   clears the window so the same qualifying samples cannot re-fire.
//! - **Scroll back**: a descent accumulator tracks how far the reader has
//!   scrolled down since leaving idle; an upward reversal fires when the
//!   descent was deep enough and recent enough, otherwise it just resets.
//!   A descent that outlives the reversal window is force-reset so a
//!   much-later reversal cannot ride on stale state.

use super::{CandidateIntent, Detector, IntentKind, IntentMetrics};
use crate::signal::types::{Sample, SamplePayload};
use crate::signal::window::SlidingWindow;
use crate::time::{Duration, Timestamp};
use tracing::debug;

/// Scroll dynamics thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ScrollDynamicsConfig {
    /// Minimum |delta| for a sample to count toward a skim (px)
    pub skim_min_delta: f64,
    /// Qualifying samples required inside the window to fire
    pub skim_count: usize,
    /// Skim sample window
    pub skim_window: Duration,
    /// Minimum descent before a reversal counts as backtracking (px)
    pub back_min_delta: f64,
    /// Reversal must occur within this window of the descent start
    pub back_window: Duration,
}

impl Default for ScrollDynamicsConfig {
    fn default() -> Self {
        Self {
            skim_min_delta: 80.0,
            skim_count: 3,
            skim_window: Duration::from_millis(5_000),
            back_min_delta: 100.0,
            back_window: Duration::from_millis(3_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescentPhase {
    Idle,
    Descending,
}

/// Descent accumulator for scroll-back detection.
#[derive(Debug, Clone, Copy)]
struct Descent {
    start_depth: f64,
    max_depth: f64,
    started_at: Timestamp,
}

/// Detects rapid skimming and scroll-back over one shared sample stream.
pub struct ScrollDynamicsDetector {
    config: ScrollDynamicsConfig,
    /// Last accepted scroll sample (timestamp, offset)
    last: Option<(Timestamp, f64)>,
    /// Instantaneous speeds of qualifying fast-scroll samples
    fast_samples: SlidingWindow<f64>,
    phase: DescentPhase,
    descent: Option<Descent>,
}

impl ScrollDynamicsDetector {
    pub fn new(config: ScrollDynamicsConfig) -> Self {
        let skim_window = config.skim_window;
        Self {
            config,
            last: None,
            fast_samples: SlidingWindow::new(skim_window),
            phase: DescentPhase::Idle,
            descent: None,
        }
    }

    fn check_skim(&mut self, now: Timestamp, delta: f64, speed: f64) -> Option<CandidateIntent> {
        if delta.abs() < self.config.skim_min_delta {
            return None;
        }
        self.fast_samples.push(now, speed);
        if self.fast_samples.len() < self.config.skim_count {
            return None;
        }

        let samples_in_window = self.fast_samples.len();
        let peak_speed = self
            .fast_samples
            .iter()
            .map(|(_, s)| *s)
            .fold(0.0, f64::max);
        // Clearing prevents the same qualifying samples from re-firing
        self.fast_samples.clear();
        debug!(samples_in_window, peak_speed, "rapid skim fired");

        Some(CandidateIntent {
            kind: IntentKind::RapidSkim,
            target: None,
            metrics: IntentMetrics::Skim {
                samples_in_window,
                peak_speed,
            },
            timestamp: now,
        })
    }

    fn check_scroll_back(
        &mut self,
        now: Timestamp,
        prev_offset: f64,
        offset: f64,
    ) -> Option<CandidateIntent> {
        self.expire_stale_descent(now);

        let delta = offset - prev_offset;
        match self.phase {
            DescentPhase::Idle => {
                if delta > 0.0 {
                    // The descent began at the depth we were at before this
                    // sample, so the whole drop counts toward the threshold.
                    self.phase = DescentPhase::Descending;
                    self.descent = Some(Descent {
                        start_depth: prev_offset,
                        max_depth: offset,
                        started_at: now,
                    });
                }
                None
            }
            DescentPhase::Descending => {
                let Some(mut descent) = self.descent else {
                    self.phase = DescentPhase::Idle;
                    return None;
                };
                if delta > 0.0 {
                    descent.max_depth = descent.max_depth.max(offset);
                    self.descent = Some(descent);
                    return None;
                }
                if delta == 0.0 {
                    return None;
                }

                // Upward reversal ends the descent either way
                self.phase = DescentPhase::Idle;
                self.descent = None;

                let descent_px = descent.max_depth - descent.start_depth;
                let elapsed = now.duration_since(descent.started_at);
                if descent_px > self.config.back_min_delta && elapsed < self.config.back_window {
                    debug!(descent_px, elapsed_ms = elapsed.as_millis(), "scroll back fired");
                    Some(CandidateIntent {
                        kind: IntentKind::ScrollBack,
                        target: None,
                        metrics: IntentMetrics::ScrollBack {
                            descent_px,
                            descent_ms: elapsed.as_millis(),
                        },
                        timestamp: now,
                    })
                } else {
                    None
                }
            }
        }
    }

    /// A descent that has outlived the reversal window cannot fire anymore.
    fn expire_stale_descent(&mut self, now: Timestamp) {
        if self.phase == DescentPhase::Descending {
            if let Some(descent) = self.descent {
                if now.duration_since(descent.started_at) >= self.config.back_window {
                    self.phase = DescentPhase::Idle;
                    self.descent = None;
                }
            }
        }
    }
}

impl Detector for ScrollDynamicsDetector {
    fn name(&self) -> &'static str {
        "scroll_dynamics"
    }

    fn handle_sample(&mut self, sample: &Sample) -> Vec<CandidateIntent> {
        let SamplePayload::Scroll { offset, .. } = sample.payload else {
            return Vec::new();
        };
        let now = sample.timestamp;

        let Some((prev_ts, prev_offset)) = self.last else {
            self.last = Some((now, offset));
            return Vec::new();
        };
        self.last = Some((now, offset));

        let delta = offset - prev_offset;
        let dt = now.duration_since(prev_ts).as_secs_f64();
        // The sampler enforces a minimum spacing, but guard regardless
        let speed = if dt > 0.0 { delta.abs() / dt } else { 0.0 };

        let mut candidates = Vec::new();
        if let Some(c) = self.check_skim(now, delta, speed) {
            candidates.push(c);
        }
        if let Some(c) = self.check_scroll_back(now, prev_offset, offset) {
            candidates.push(c);
        }
        candidates
    }

    fn tick(&mut self, now: Timestamp) -> Vec<CandidateIntent> {
        self.expire_stale_descent(now);
        Vec::new()
    }
}
