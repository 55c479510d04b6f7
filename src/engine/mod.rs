//! Engine Wiring
//!
//! [`IntentEngine`] assembles the pipeline: sampler → detectors → arbiter.
//! Event intake and arbitration are synchronous and complete within one
//! callback; enrichment jobs returned from intake are resolved separately
//! through [`IntentEngine::resolve`], the engine's only suspension point.

pub mod replay;
pub mod trace;

pub use replay::{replay, ReplayOptions, ReplaySummary};
pub use trace::{PageSnapshot, Trace, TraceMetadata};

use crate::app::config::EngineConfig;
use crate::arbiter::{Arbiter, AugmentJob, SessionFlags};
use crate::augment::{AugmentClient, AugmentEndpoint};
use crate::detect::{
    CursorHesitationDetector, ExitIntentDetector, HoverDwellDetector, ScrollDynamicsDetector,
};
use crate::page::ContentSource;
use crate::present::PresentationAdapter;
use crate::signal::sampler::Sampler;
use crate::signal::types::{RawEvent, SampleKind};
use crate::telemetry::TelemetrySink;
use crate::time::Timestamp;

/// The assembled detection and arbitration pipeline.
pub struct IntentEngine<P: PresentationAdapter, T: TelemetrySink, S: ContentSource> {
    sampler: Sampler,
    arbiter: Arbiter<P, T>,
    content: S,
}

impl<P: PresentationAdapter, T: TelemetrySink, S: ContentSource> IntentEngine<P, T, S> {
    /// Build the pipeline from configuration, subscribing all four
    /// detectors in a fixed order.
    pub fn new(
        config: &EngineConfig,
        presenter: P,
        telemetry: T,
        content: S,
        flags: SessionFlags,
    ) -> Self {
        let mut sampler = Sampler::new(
            config.sampler.pointer_interval(),
            config.sampler.scroll_interval(),
        );
        sampler.subscribe(Box::new(HoverDwellDetector::new(config.hover_dwell())));
        sampler.subscribe(Box::new(ScrollDynamicsDetector::new(
            config.scroll_dynamics(),
        )));
        sampler.subscribe(Box::new(CursorHesitationDetector::new(
            config.cursor_hesitation(),
        )));
        sampler.subscribe(Box::new(ExitIntentDetector::new(config.exit_intent())));

        let arbiter = Arbiter::new(config.arbiter(), presenter, telemetry, flags);

        Self {
            sampler,
            arbiter,
            content,
        }
    }

    /// Process one raw host event. Runs the sampler, every detector, and
    /// arbitration for each emitted candidate, all synchronously; returns
    /// the enrichment jobs the dispatches requested. Never fails and
    /// never panics out of the callback.
    pub fn handle_event(&mut self, event: RawEvent) -> Vec<AugmentJob> {
        let now = event.timestamp;
        let is_scroll = event.kind() == SampleKind::Scroll;

        let candidates = self.sampler.on_raw_event(&event);
        if is_scroll {
            self.arbiter.on_scroll();
        }

        let mut jobs = Vec::new();
        for candidate in &candidates {
            let (_decision, job) = self.arbiter.on_candidate(candidate, &self.content, now);
            jobs.extend(job);
        }
        jobs
    }

    /// Advance engine time: detector deadlines and arbiter deadlines fire
    /// here, and resulting candidates are arbitrated like sampled ones.
    pub fn tick(&mut self, now: Timestamp) -> Vec<AugmentJob> {
        let candidates = self.sampler.tick(now);
        self.arbiter.tick(now);

        let mut jobs = Vec::new();
        for candidate in &candidates {
            let (_decision, job) = self.arbiter.on_candidate(candidate, &self.content, now);
            jobs.extend(job);
        }
        jobs
    }

    /// Resolve one enrichment job against the augmentation client. This
    /// is the engine's only await; completion re-validates the overlay, so
    /// results landing after dismissal or replacement are dropped.
    pub async fn resolve(&mut self, job: AugmentJob, client: &impl AugmentClient) {
        let outcome = match job.endpoint {
            AugmentEndpoint::Summarize => client.summarize(&job.excerpt).await,
            AugmentEndpoint::Simplify => client.simplify(&job.excerpt).await,
            AugmentEndpoint::Suggest => client.suggest(&job.excerpt).await,
            AugmentEndpoint::Related => client.related(&job.excerpt).await,
        };
        self.arbiter.complete_augmentation(&job, outcome);
    }

    /// Host notification that the reader dismissed the active overlay.
    pub fn dismiss_overlay(&mut self) {
        self.arbiter.dismiss_overlay();
    }

    /// Session flags for host persistence at page unload.
    pub fn session_flags(&self) -> SessionFlags {
        self.arbiter.session_flags()
    }

    /// Arbiter access for inspection.
    pub fn arbiter(&self) -> &Arbiter<P, T> {
        &self.arbiter
    }

    /// Sampler acceptance counters.
    pub fn sampler_stats(&self) -> crate::signal::sampler::SamplerStats {
        self.sampler.stats()
    }
}
