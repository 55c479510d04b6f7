//! Cursor Hesitation Detection
//!
//! A fixed-capacity buffer of recent pointer positions is evaluated on a
//! periodic check: when the buffer is full, spans the minimum observation
//! time, and the positions stay within a small region (low variance around
//! the centroid), the reader is hesitating. A cooldown deadline gates
//! re-fire so continued stillness does not produce repeated prompts.

use super::{CandidateIntent, Detector, IntentKind, IntentMetrics};
use crate::signal::types::{Sample, SamplePayload};
use crate::signal::window::SlidingWindow;
use crate::time::{Deadline, Duration, Timestamp};
use tracing::debug;

/// Cursor hesitation thresholds.
#[derive(Debug, Clone, Copy)]
pub struct CursorHesitationConfig {
    /// Position buffer capacity
    pub buffer_len: usize,
    /// Variance below this is stillness (px²)
    pub variance_threshold: f64,
    /// Interval between periodic checks
    pub check_interval: Duration,
    /// Buffer must span at least this long to be judged
    pub min_observation: Duration,
    /// Minimum re-fire interval after a hesitation
    pub cooldown: Duration,
}

impl Default for CursorHesitationConfig {
    fn default() -> Self {
        Self {
            buffer_len: 20,
            variance_threshold: 5_000.0,
            check_interval: Duration::from_millis(2_500),
            min_observation: Duration::from_millis(2_000),
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Detects a pointer lingering within a small spatial region.
pub struct CursorHesitationDetector {
    config: CursorHesitationConfig,
    positions: SlidingWindow<(f64, f64)>,
    check_timer: Deadline,
    cooldown_timer: Deadline,
}

impl CursorHesitationDetector {
    pub fn new(config: CursorHesitationConfig) -> Self {
        // The horizon generously exceeds the observation minimum: the
        // buffer is capacity-bounded, and a still pointer stops producing
        // samples, so aggressive time eviction would starve the check.
        let horizon = Duration::from_millis(config.min_observation.as_millis() * 30);
        Self {
            config,
            positions: SlidingWindow::with_capacity(horizon, config.buffer_len),
            check_timer: Deadline::new("hesitation-check"),
            cooldown_timer: Deadline::new("hesitation-cooldown"),
        }
    }

    /// Centroid and mean squared distance from it.
    fn centroid_variance(&self) -> ((f64, f64), f64) {
        let n = self.positions.len() as f64;
        let (sum_x, sum_y) = self
            .positions
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (_, (x, y))| (sx + x, sy + y));
        let centroid = (sum_x / n, sum_y / n);

        let sum_sq = self.positions.iter().fold(0.0, |acc, (_, (x, y))| {
            let dx = x - centroid.0;
            let dy = y - centroid.1;
            acc + dx * dx + dy * dy
        });
        (centroid, sum_sq / n)
    }
}

impl Detector for CursorHesitationDetector {
    fn name(&self) -> &'static str {
        "cursor_hesitation"
    }

    fn handle_sample(&mut self, sample: &Sample) -> Vec<CandidateIntent> {
        if let SamplePayload::Pointer { x, y } = sample.payload {
            self.positions.push(sample.timestamp, (x, y));
        }
        Vec::new()
    }

    fn tick(&mut self, now: Timestamp) -> Vec<CandidateIntent> {
        if !self.check_timer.is_armed() {
            self.check_timer.arm(now, self.config.check_interval);
            return Vec::new();
        }
        if !self.check_timer.expire(now) {
            return Vec::new();
        }
        self.check_timer.arm(now, self.config.check_interval);

        if self.cooldown_timer.is_pending(now) {
            return Vec::new();
        }
        self.cooldown_timer.expire(now);

        if !self.positions.is_full() || self.positions.span() < self.config.min_observation {
            return Vec::new();
        }

        let (centroid, variance) = self.centroid_variance();
        if variance >= self.config.variance_threshold {
            return Vec::new();
        }

        self.cooldown_timer.arm(now, self.config.cooldown);
        debug!(variance, "cursor hesitation fired");
        vec![CandidateIntent {
            kind: IntentKind::CursorHesitation,
            target: None,
            metrics: IntentMetrics::Hesitation {
                centroid_x: centroid.0,
                centroid_y: centroid.1,
                variance,
            },
            timestamp: now,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::types::RawEvent;

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn detector() -> CursorHesitationDetector {
        CursorHesitationDetector::new(CursorHesitationConfig::default())
    }

    fn feed(d: &mut CursorHesitationDetector, ms: u64, x: f64, y: f64) {
        let sample = Sample::from_event(&RawEvent::pointer_move(at(ms), x, y));
        assert!(d.handle_sample(&sample).is_empty());
    }

    /// Fill the buffer with near-still positions: 20 samples, 150ms apart
    /// (spans 2850ms ≥ the 2s observation minimum).
    fn feed_still(d: &mut CursorHesitationDetector, from_ms: u64) -> u64 {
        for i in 0..20u64 {
            let jitter = (i % 3) as f64;
            feed(d, from_ms + i * 150, 500.0 + jitter, 400.0 - jitter);
        }
        from_ms + 19 * 150
    }

    /// Drive ticks until one fires or `until` is reached.
    fn run_checks(
        d: &mut CursorHesitationDetector,
        from_ms: u64,
        until_ms: u64,
    ) -> Vec<CandidateIntent> {
        let mut ms = from_ms;
        while ms <= until_ms {
            let fired = d.tick(at(ms));
            if !fired.is_empty() {
                return fired;
            }
            ms += 100;
        }
        Vec::new()
    }

    #[test]
    fn test_stillness_fires() {
        let mut d = detector();
        d.tick(at(0)); // arm the periodic check
        let end = feed_still(&mut d, 0);

        let fired = run_checks(&mut d, 100, end + 5_000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, IntentKind::CursorHesitation);
        match fired[0].metrics {
            IntentMetrics::Hesitation { variance, .. } => {
                assert!(variance < 10.0, "near-still trace, got {variance}");
            }
            _ => panic!("wrong metrics"),
        }
    }

    #[test]
    fn test_cooldown_blocks_refire() {
        let mut d = detector();
        d.tick(at(0));
        let end = feed_still(&mut d, 0);

        let first = run_checks(&mut d, 100, end + 5_000);
        assert_eq!(first.len(), 1);
        let fired_at = first[0].timestamp.as_millis();

        // Still pointer, checks keep running: nothing within the cooldown
        let during = run_checks(&mut d, fired_at + 100, fired_at + 29_000);
        assert!(during.is_empty());

        // After the cooldown the same stillness fires again
        let after = run_checks(&mut d, fired_at + 29_100, fired_at + 40_000);
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn test_moving_pointer_does_not_fire() {
        let mut d = detector();
        d.tick(at(0));

        // 20 samples sweeping across the page
        for i in 0..20u64 {
            feed(&mut d, i * 150, (i as f64) * 60.0, (i as f64) * 45.0);
        }

        assert!(run_checks(&mut d, 100, 10_000).is_empty());
    }

    #[test]
    fn test_partial_buffer_does_not_fire() {
        let mut d = detector();
        d.tick(at(0));

        for i in 0..10u64 {
            feed(&mut d, i * 150, 500.0, 400.0);
        }

        assert!(run_checks(&mut d, 100, 10_000).is_empty());
    }

    #[test]
    fn test_short_span_does_not_fire() {
        let mut d = detector();
        d.tick(at(0));

        // Full buffer but only 950ms of observation
        for i in 0..20u64 {
            feed(&mut d, i * 50, 500.0, 400.0);
        }

        assert!(run_checks(&mut d, 100, 1_500).is_empty());
    }

    #[test]
    fn test_checks_run_on_interval_not_every_tick() {
        let mut d = detector();
        d.tick(at(0));
        feed_still(&mut d, 0);

        // Ticks before the first check interval elapses never evaluate
        assert!(d.tick(at(1_000)).is_empty());
        assert!(d.tick(at(2_400)).is_empty());
        assert_eq!(d.tick(at(2_900)).len(), 1);
    }

    #[test]
    fn test_movement_after_stillness_resets() {
        let mut d = detector();
        d.tick(at(0));
        let end = feed_still(&mut d, 0);
        assert_eq!(run_checks(&mut d, 100, end + 5_000).len(), 1);

        // 31s later the cooldown is over; a fresh sweep of movement
        // repopulates the buffer with high-variance positions
        let base = end + 31_000;
        for i in 0..20u64 {
            feed(&mut d, base + i * 150, (i as f64) * 80.0, 300.0);
        }
        assert!(run_checks(&mut d, base, base + 6_000).is_empty());
    }
}
