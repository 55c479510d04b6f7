//! Signal Sampler
//!
//! Rate limiter and fan-out for raw host events. Continuous streams
//! (pointer movement, scrolling) are thinned to a configured minimum
//! interval to bound evaluation cost; discrete events (hover enter/leave,
//! exit) always pass. Accepted samples are forwarded to every subscribed
//! detector in subscription order.

use super::types::{RawEvent, Sample, SampleKind};
use crate::detect::{CandidateIntent, Detector};
use crate::time::{Duration, Timestamp};
use tracing::trace;

/// Sampler acceptance counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct SamplerStats {
    /// Samples forwarded to detectors
    pub accepted: u64,
    /// Samples dropped by the rate limiter
    pub dropped: u64,
}

/// Rate-limiting fan-out over a list of detectors.
pub struct Sampler {
    pointer_interval: Duration,
    scroll_interval: Duration,
    last_pointer: Option<Timestamp>,
    last_scroll: Option<Timestamp>,
    detectors: Vec<Box<dyn Detector>>,
    stats: SamplerStats,
}

impl Sampler {
    /// Create a sampler with the given minimum sampling intervals.
    pub fn new(pointer_interval: Duration, scroll_interval: Duration) -> Self {
        Self {
            pointer_interval,
            scroll_interval,
            last_pointer: None,
            last_scroll: None,
            detectors: Vec::new(),
            stats: SamplerStats::default(),
        }
    }

    /// Subscribe a detector. Samples are delivered in subscription order.
    pub fn subscribe(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Number of subscribed detectors.
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Acceptance counters.
    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    /// Process one raw event: rate-limit, normalize, fan out. Returns the
    /// candidates emitted by detectors in response. Never fails; events
    /// arriving faster than the configured floor are counted and dropped.
    pub fn on_raw_event(&mut self, event: &RawEvent) -> Vec<CandidateIntent> {
        if !self.accept(event) {
            self.stats.dropped += 1;
            return Vec::new();
        }
        self.stats.accepted += 1;

        let sample = Sample::from_event(event);
        trace!(kind = ?sample.kind, ts = sample.timestamp.as_millis(), "sample accepted");

        let mut candidates = Vec::new();
        for detector in &mut self.detectors {
            candidates.extend(detector.handle_sample(&sample));
        }
        candidates
    }

    /// Advance detector time, collecting candidates from due deadlines.
    pub fn tick(&mut self, now: Timestamp) -> Vec<CandidateIntent> {
        let mut candidates = Vec::new();
        for detector in &mut self.detectors {
            candidates.extend(detector.tick(now));
        }
        candidates
    }

    fn accept(&mut self, event: &RawEvent) -> bool {
        let ts = event.timestamp;
        match event.kind() {
            SampleKind::PointerMove => {
                accept_after(&mut self.last_pointer, ts, self.pointer_interval)
            }
            SampleKind::Scroll => accept_after(&mut self.last_scroll, ts, self.scroll_interval),
            // Discrete events are never rate limited
            _ => true,
        }
    }
}

/// Accept when at least `interval` has elapsed since the last acceptance,
/// updating the acceptance mark on success.
fn accept_after(last: &mut Option<Timestamp>, ts: Timestamp, interval: Duration) -> bool {
    match *last {
        Some(prev) if ts.duration_since(prev) < interval => false,
        _ => {
            *last = Some(ts);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::types::SamplePayload;

    /// Records every sample it sees; emits nothing.
    struct Probe {
        seen: std::rc::Rc<std::cell::RefCell<Vec<SampleKind>>>,
    }

    impl Detector for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn handle_sample(&mut self, sample: &Sample) -> Vec<CandidateIntent> {
            self.seen.borrow_mut().push(sample.kind);
            Vec::new()
        }

        fn tick(&mut self, _now: Timestamp) -> Vec<CandidateIntent> {
            Vec::new()
        }
    }

    fn sampler_with_probe() -> (Sampler, std::rc::Rc<std::cell::RefCell<Vec<SampleKind>>>) {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut sampler = Sampler::new(Duration::from_millis(50), Duration::from_millis(100));
        sampler.subscribe(Box::new(Probe { seen: seen.clone() }));
        (sampler, seen)
    }

    #[test]
    fn test_scroll_rate_limit() {
        let (mut sampler, seen) = sampler_with_probe();

        for ms in [0u64, 40, 90, 100, 150, 210] {
            sampler.on_raw_event(&RawEvent::scroll(
                Timestamp::from_millis(ms),
                ms as f64,
                5_000.0,
            ));
        }

        // Accepted: 0, 100, 210
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(sampler.stats().accepted, 3);
        assert_eq!(sampler.stats().dropped, 3);
    }

    #[test]
    fn test_pointer_rate_limit() {
        let (mut sampler, seen) = sampler_with_probe();

        for ms in [0u64, 20, 49, 50, 80, 101] {
            sampler.on_raw_event(&RawEvent::pointer_move(
                Timestamp::from_millis(ms),
                10.0,
                10.0,
            ));
        }

        // Accepted: 0, 50, 101
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_discrete_events_never_dropped() {
        let (mut sampler, seen) = sampler_with_probe();
        let target = crate::signal::types::TargetInfo {
            id: crate::signal::types::TargetId(1),
            width: 300.0,
            height: 50.0,
            region: crate::signal::types::TargetRegion::Content,
            text_len: 120,
        };

        sampler.on_raw_event(&RawEvent::hover_enter(Timestamp::from_millis(0), target));
        sampler.on_raw_event(&RawEvent::hover_leave(
            Timestamp::from_millis(1),
            target.id,
        ));
        sampler.on_raw_event(&RawEvent::pointer_exit_top(Timestamp::from_millis(2), 5.0));

        assert_eq!(
            *seen.borrow(),
            vec![
                SampleKind::HoverEnter,
                SampleKind::HoverLeave,
                SampleKind::PointerExitTop
            ]
        );
        assert_eq!(sampler.stats().dropped, 0);
    }

    #[test]
    fn test_independent_streams() {
        let (mut sampler, seen) = sampler_with_probe();

        // A pointer sample between two scroll samples does not reset the
        // scroll stream's acceptance mark.
        sampler.on_raw_event(&RawEvent::scroll(Timestamp::from_millis(0), 0.0, 1_000.0));
        sampler.on_raw_event(&RawEvent::pointer_move(Timestamp::from_millis(60), 5.0, 5.0));
        sampler.on_raw_event(&RawEvent::scroll(
            Timestamp::from_millis(100),
            120.0,
            1_000.0,
        ));

        assert_eq!(
            *seen.borrow(),
            vec![SampleKind::Scroll, SampleKind::PointerMove, SampleKind::Scroll]
        );
    }

    #[test]
    fn test_normalized_payload_matches_event() {
        let event = RawEvent::scroll(Timestamp::from_millis(0), 300.0, 900.0);
        let sample = Sample::from_event(&event);
        assert!(matches!(
            sample.payload,
            SamplePayload::Scroll { offset, max_offset } if offset == 300.0 && max_offset == 900.0
        ));
    }
}
