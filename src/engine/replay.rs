//! Deterministic Trace Replay
//!
//! Drives a captured trace through an engine on virtual time. Between
//! events the replay steps `tick` at a fixed granularity so deferred
//! deadlines (dwell delays, hesitation checks, highlight clears) fire at
//! the same virtual instants on every run. Enrichment jobs are resolved
//! inline against the supplied client.

use super::trace::Trace;
use crate::augment::AugmentClient;
use crate::page::ContentSource;
use crate::present::PresentationAdapter;
use crate::telemetry::TelemetrySink;
use crate::time::{Duration, Timestamp};
use crate::IntentEngine;
use std::collections::BTreeMap;
use tracing::info;

/// Replay tuning.
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Virtual-time spacing between synthetic ticks
    pub tick_step: Duration,
    /// Extra virtual time appended after the last event so trailing
    /// deadlines can fire
    pub drain: Duration,
    /// Skip augmentation resolution entirely
    pub offline: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            tick_step: Duration::from_millis(50),
            drain: Duration::from_millis(5_000),
            offline: false,
        }
    }
}

/// Counters accumulated over one replay.
#[derive(Debug, Default, Clone)]
pub struct ReplaySummary {
    /// Events fed to the engine
    pub events: usize,
    /// Enrichment jobs produced by dispatches
    pub jobs: usize,
    /// Enrichment jobs resolved (0 when offline)
    pub resolved: usize,
    /// Telemetry event types and their counts
    pub decisions: BTreeMap<String, usize>,
}

/// Replay a trace through the engine.
///
/// Telemetry decision counts in the summary are taken from `collect`,
/// which should be the same sink instance the engine records to.
pub async fn replay<P, T, S, A>(
    trace: &Trace,
    engine: &mut IntentEngine<P, T, S>,
    client: &A,
    collect: &crate::telemetry::MemorySink,
    options: ReplayOptions,
) -> ReplaySummary
where
    P: PresentationAdapter,
    T: TelemetrySink,
    S: ContentSource,
    A: AugmentClient,
{
    let mut summary = ReplaySummary::default();
    let mut clock = trace
        .events
        .first()
        .map(|e| e.timestamp)
        .unwrap_or(Timestamp::from_millis(0));

    for event in &trace.events {
        // Step virtual time up to the event so due deadlines fire first
        while event.timestamp.is_after(clock) {
            clock = step(clock, event.timestamp, options.tick_step);
            let jobs = engine.tick(clock);
            summary.jobs += jobs.len();
            for job in jobs {
                if !options.offline {
                    engine.resolve(job, client).await;
                    summary.resolved += 1;
                }
            }
        }

        summary.events += 1;
        let jobs = engine.handle_event(*event);
        summary.jobs += jobs.len();
        for job in jobs {
            if !options.offline {
                engine.resolve(job, client).await;
                summary.resolved += 1;
            }
        }
    }

    // Drain trailing deadlines
    let end = clock + options.drain;
    while end.is_after(clock) {
        clock = step(clock, end, options.tick_step);
        let jobs = engine.tick(clock);
        summary.jobs += jobs.len();
        for job in jobs {
            if !options.offline {
                engine.resolve(job, client).await;
                summary.resolved += 1;
            }
        }
    }

    for event in collect.events() {
        *summary.decisions.entry(event.event_type).or_insert(0) += 1;
    }

    info!(
        events = summary.events,
        jobs = summary.jobs,
        "replay complete"
    );
    summary
}

/// Advance the clock by one tick step, landing exactly on `limit`.
fn step(clock: Timestamp, limit: Timestamp, tick_step: Duration) -> Timestamp {
    let next = clock + tick_step;
    if next.is_after(limit) {
        limit
    } else {
        next
    }
}
