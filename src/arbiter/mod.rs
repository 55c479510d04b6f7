//! Intent Arbitration
//!
//! The arbiter receives candidate intents from the detectors and decides
//! whether each may dispatch an intervention. Decision order is fixed:
//! overlay exclusivity first, then per-kind cooldown and session dedup,
//! then dispatch. Every decision, fired or suppressed, goes to the
//! telemetry sink.
//!
//! Dispatch renders the base intervention synchronously through the
//! presentation adapter and may return an [`AugmentJob`] for the caller
//! to resolve against the augmentation client. Enrichment lands through
//! [`Arbiter::complete_augmentation`], which re-validates the overlay
//! before touching it: results arriving after dismissal or after a newer
//! dispatch are dropped, never resurrected.

pub mod records;

pub use records::{HighlightRecord, InterventionRecord, SessionFlags};

use crate::augment::{AugmentEndpoint, Augmentation};
use crate::detect::{CandidateIntent, IntentKind, PresentationCategory};
use crate::page::{truncate_chars, ContentSource};
use crate::present::{OverlayKind, PresentationAdapter, SidebarItem};
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::time::{Deadline, Duration, Timestamp};
use std::collections::HashMap;
use tracing::{debug, info};

/// Shown while an overlay waits for enrichment.
const LOADING_PLACEHOLDER: &str = "Analyzing page…";

/// Fallback when an augmentation job carried no source text at all.
const EMPTY_EXCERPT_FALLBACK: &str = "No content available.";

/// Arbitration policy knobs.
#[derive(Debug, Clone)]
pub struct ArbiterConfig {
    /// Highlight auto-clear delay; zero persists until dismissal
    pub hover_persist: Duration,
    /// Defense-layer minimum re-fire interval for hesitation
    pub hesitation_refire: Duration,
    /// Excerpt sizes per augmentation source
    pub skim_excerpt_chars: usize,
    pub reread_excerpt_chars: usize,
    pub suggest_excerpt_chars: usize,
    pub exit_excerpt_chars: usize,
    /// Length of the local fallback shown when augmentation fails
    pub fallback_chars: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            hover_persist: Duration::from_millis(3_000),
            hesitation_refire: Duration::from_secs(30),
            skim_excerpt_chars: 1_000,
            reread_excerpt_chars: 1_500,
            suggest_excerpt_chars: 2_000,
            exit_excerpt_chars: 2_000,
            fallback_chars: 280,
        }
    }
}

/// Outcome of arbitrating one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Intervention dispatched
    Dispatched,
    /// Suppressed: an undismissed overlay is already active
    SuppressedOverlayActive,
    /// Suppressed: the kind re-fired inside its cooldown
    SuppressedCooldown,
    /// Suppressed: already shown this session
    SuppressedSession,
}

impl Decision {
    pub fn was_dispatched(&self) -> bool {
        matches!(self, Decision::Dispatched)
    }

    fn telemetry_suffix(&self) -> &'static str {
        match self {
            Decision::Dispatched => "fired",
            Decision::SuppressedOverlayActive => "suppressed_overlay",
            Decision::SuppressedCooldown => "suppressed_cooldown",
            Decision::SuppressedSession => "suppressed_session",
        }
    }
}

/// An enrichment request produced by a dispatch, to be resolved by the
/// caller against the augmentation client.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentJob {
    /// Service endpoint to call
    pub endpoint: AugmentEndpoint,
    /// Source text (or URL for related lookups)
    pub excerpt: String,
    /// Dispatch generation this job belongs to
    pub generation: u64,
}

/// The intervention decision engine.
pub struct Arbiter<P: PresentationAdapter, T: TelemetrySink> {
    config: ArbiterConfig,
    presenter: P,
    telemetry: T,
    flags: SessionFlags,
    overlay: Option<InterventionRecord>,
    highlight: Option<HighlightRecord>,
    last_fired: HashMap<IntentKind, Timestamp>,
    generation: u64,
}

impl<P: PresentationAdapter, T: TelemetrySink> Arbiter<P, T> {
    pub fn new(config: ArbiterConfig, presenter: P, telemetry: T, flags: SessionFlags) -> Self {
        Self {
            config,
            presenter,
            telemetry,
            flags,
            overlay: None,
            highlight: None,
            last_fired: HashMap::new(),
            generation: 0,
        }
    }

    /// Current session flags (for host persistence).
    pub fn session_flags(&self) -> SessionFlags {
        self.flags
    }

    /// The active overlay record, if any.
    pub fn active_overlay(&self) -> Option<&InterventionRecord> {
        self.overlay.as_ref()
    }

    /// Whether an inline highlight is currently painted.
    pub fn has_highlight(&self) -> bool {
        self.highlight.is_some()
    }

    /// Arbitrate one candidate. Decision order: overlay exclusivity, then
    /// cooldown / session dedup, then dispatch.
    pub fn on_candidate(
        &mut self,
        candidate: &CandidateIntent,
        source: &impl ContentSource,
        now: Timestamp,
    ) -> (Decision, Option<AugmentJob>) {
        let decision = self.decide(candidate, now);
        let job = if decision.was_dispatched() {
            self.dispatch(candidate, source, now)
        } else {
            debug!(kind = candidate.kind.as_str(), ?decision, "candidate suppressed");
            None
        };

        self.record_decision(candidate, source, decision);
        (decision, job)
    }

    fn decide(&self, candidate: &CandidateIntent, now: Timestamp) -> Decision {
        // 1. Overlay exclusivity (checked before cooldown)
        if candidate.kind.category() == PresentationCategory::Overlay {
            if let Some(overlay) = &self.overlay {
                if !overlay.dismissed {
                    return Decision::SuppressedOverlayActive;
                }
            }
        }

        // 2. Per-kind cooldown
        if let Some(min) = self.min_refire(candidate.kind) {
            if let Some(last) = self.last_fired.get(&candidate.kind) {
                if now.duration_since(*last) < min {
                    return Decision::SuppressedCooldown;
                }
            }
        }

        // 2b. Session dedup
        if candidate.kind == IntentKind::ExitIntent && self.flags.exit_intervention_shown {
            return Decision::SuppressedSession;
        }

        Decision::Dispatched
    }

    /// Minimum re-fire interval. Hover has none beyond its own
    /// leave/re-enter cycle, skim resets implicitly through its window,
    /// exit dedups through the session flag.
    fn min_refire(&self, kind: IntentKind) -> Option<Duration> {
        match kind {
            IntentKind::CursorHesitation => Some(self.config.hesitation_refire),
            _ => None,
        }
    }

    fn dispatch(
        &mut self,
        candidate: &CandidateIntent,
        source: &impl ContentSource,
        now: Timestamp,
    ) -> Option<AugmentJob> {
        self.last_fired.insert(candidate.kind, now);
        info!(kind = candidate.kind.as_str(), "intervention dispatched");

        match candidate.kind {
            IntentKind::HoverDwell => {
                let target = candidate.target?;
                // Replacing a previous highlight clears it first
                self.clear_highlight();

                self.presenter
                    .apply_highlight(&target, source.theme_hint(target.id));
                let mut clear_timer = Deadline::new("highlight-clear");
                if self.config.hover_persist > Duration::ZERO {
                    clear_timer.arm(now, self.config.hover_persist);
                }
                self.highlight = Some(HighlightRecord {
                    target,
                    clear_timer,
                });
                None
            }
            IntentKind::RapidSkim => Some(self.dispatch_overlay(
                candidate,
                now,
                OverlayKind::Takeaways,
                AugmentEndpoint::Summarize,
                source.visible_text(self.config.skim_excerpt_chars),
            )),
            IntentKind::ScrollBack => Some(self.dispatch_overlay(
                candidate,
                now,
                OverlayKind::Reread,
                AugmentEndpoint::Simplify,
                source.visible_text(self.config.reread_excerpt_chars),
            )),
            IntentKind::CursorHesitation => Some(self.dispatch_overlay(
                candidate,
                now,
                OverlayKind::Suggestion,
                AugmentEndpoint::Suggest,
                source.visible_text(self.config.suggest_excerpt_chars),
            )),
            IntentKind::ExitIntent => {
                self.flags.exit_intervention_shown = true;
                Some(self.dispatch_overlay(
                    candidate,
                    now,
                    OverlayKind::ExitPrompt,
                    AugmentEndpoint::Summarize,
                    source.visible_text(self.config.exit_excerpt_chars),
                ))
            }
        }
    }

    fn dispatch_overlay(
        &mut self,
        candidate: &CandidateIntent,
        now: Timestamp,
        overlay_kind: OverlayKind,
        endpoint: AugmentEndpoint,
        excerpt: String,
    ) -> AugmentJob {
        self.generation += 1;
        self.overlay = Some(InterventionRecord {
            kind: candidate.kind,
            started_at: now,
            dismissed: false,
            generation: self.generation,
        });
        self.presenter
            .show_overlay(overlay_kind, LOADING_PLACEHOLDER, true);

        AugmentJob {
            endpoint,
            excerpt,
            generation: self.generation,
        }
    }

    /// Deliver an enrichment result for a previously-dispatched job.
    ///
    /// Results that arrive after the overlay was dismissed, replaced, or
    /// never existed are dropped: a stale completion must be a no-op
    /// rather than resurrect a dismissed overlay. Unavailable results
    /// fall back to a deterministic truncation of the job's own excerpt.
    pub fn complete_augmentation(&mut self, job: &AugmentJob, outcome: Augmentation) {
        let live = matches!(
            &self.overlay,
            Some(overlay) if !overlay.dismissed && overlay.generation == job.generation
        );
        if !live {
            debug!(generation = job.generation, "stale augmentation result dropped");
            return;
        }

        match outcome {
            Augmentation::Summary(text) | Augmentation::Simplified(text) => {
                self.presenter.update_overlay(&text, &[]);
            }
            Augmentation::Suggestions {
                summary,
                suggestions,
            } => {
                self.presenter.update_overlay(&summary, &suggestions);
            }
            Augmentation::Related(articles) => {
                let items: Vec<SidebarItem> = articles
                    .into_iter()
                    .map(|a| SidebarItem {
                        title: a.title,
                        url: a.url,
                        image: a.image,
                    })
                    .collect();
                self.presenter.show_sidebar(&items);
            }
            Augmentation::Unavailable => {
                let fallback = self.fallback_excerpt(&job.excerpt);
                self.presenter.update_overlay(&fallback, &[]);
            }
        }
    }

    /// Deterministic local fallback for a failed augmentation call.
    fn fallback_excerpt(&self, excerpt: &str) -> String {
        let truncated = truncate_chars(excerpt.trim(), self.config.fallback_chars);
        if truncated.is_empty() {
            EMPTY_EXCERPT_FALLBACK.to_string()
        } else {
            truncated
        }
    }

    /// Host notification that the reader dismissed the active overlay.
    pub fn dismiss_overlay(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            if !overlay.dismissed {
                overlay.dismissed = true;
                self.presenter.dismiss_overlay();
            }
        }
    }

    /// Scrolling clears any inline highlight immediately.
    pub fn on_scroll(&mut self) {
        self.clear_highlight();
    }

    /// Fire due arbiter deadlines (highlight auto-clear).
    pub fn tick(&mut self, now: Timestamp) {
        let expired = match self.highlight.as_mut() {
            Some(h) => h.clear_timer.expire(now),
            None => false,
        };
        if expired {
            self.clear_highlight();
        }
    }

    fn clear_highlight(&mut self) {
        if let Some(mut highlight) = self.highlight.take() {
            // Cancel in the same transition: a deadline surviving the
            // record would be a ghost trigger
            highlight.clear_timer.cancel();
            self.presenter.remove_highlight(&highlight.target);
        }
    }

    fn record_decision(
        &self,
        candidate: &CandidateIntent,
        source: &impl ContentSource,
        decision: Decision,
    ) {
        let event_type = format!(
            "{}_{}",
            candidate.kind.as_str(),
            decision.telemetry_suffix()
        );
        let metadata =
            serde_json::to_value(candidate.metrics).unwrap_or(serde_json::Value::Null);
        self.telemetry.record(TelemetryEvent::new(
            event_type,
            domain_of(&source.page_url()),
            metadata,
        ));
    }
}

/// Host part of a URL, for telemetry.
fn domain_of(url: &str) -> String {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::IntentMetrics;
    use crate::page::StaticContent;
    use crate::present::{LogPresenter, ThemeHint};
    use crate::signal::types::{TargetId, TargetInfo, TargetRegion};
    use crate::telemetry::MemorySink;

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn content() -> StaticContent {
        StaticContent::new(
            "https://news.example.com/story?id=1",
            "First sentence. Second sentence. Third sentence.",
        )
    }

    fn skim_candidate(ms: u64) -> CandidateIntent {
        CandidateIntent {
            kind: IntentKind::RapidSkim,
            target: None,
            metrics: IntentMetrics::Skim {
                samples_in_window: 3,
                peak_speed: 900.0,
            },
            timestamp: at(ms),
        }
    }

    fn hesitation_candidate(ms: u64) -> CandidateIntent {
        CandidateIntent {
            kind: IntentKind::CursorHesitation,
            target: None,
            metrics: IntentMetrics::Hesitation {
                centroid_x: 10.0,
                centroid_y: 20.0,
                variance: 100.0,
            },
            timestamp: at(ms),
        }
    }

    fn exit_candidate(ms: u64) -> CandidateIntent {
        CandidateIntent {
            kind: IntentKind::ExitIntent,
            target: None,
            metrics: IntentMetrics::Exit {
                scroll_progress_percent: 40.0,
            },
            timestamp: at(ms),
        }
    }

    fn dwell_candidate(ms: u64, id: u64) -> CandidateIntent {
        CandidateIntent {
            kind: IntentKind::HoverDwell,
            target: Some(TargetInfo {
                id: TargetId(id),
                width: 400.0,
                height: 80.0,
                region: TargetRegion::Content,
                text_len: 150,
            }),
            metrics: IntentMetrics::Dwell {
                target_text_len: 150,
                dwell_ms: 1_500,
            },
            timestamp: at(ms),
        }
    }

    fn arbiter(sink: &MemorySink) -> Arbiter<LogPresenter, &MemorySink> {
        Arbiter::new(
            ArbiterConfig::default(),
            LogPresenter,
            sink,
            SessionFlags::default(),
        )
    }

    #[test]
    fn test_overlay_exclusivity() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (d1, job1) = arb.on_candidate(&skim_candidate(1_000), &src, at(1_000));
        assert_eq!(d1, Decision::Dispatched);
        assert!(job1.is_some());

        let (d2, job2) = arb.on_candidate(&exit_candidate(1_500), &src, at(1_500));
        assert_eq!(d2, Decision::SuppressedOverlayActive);
        assert!(job2.is_none());

        // After dismissal the next overlay candidate may fire
        arb.dismiss_overlay();
        let (d3, _) = arb.on_candidate(&exit_candidate(2_000), &src, at(2_000));
        assert_eq!(d3, Decision::Dispatched);
    }

    #[test]
    fn test_inline_highlight_exempt_from_exclusivity() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        arb.on_candidate(&skim_candidate(1_000), &src, at(1_000));
        let (d, job) = arb.on_candidate(&dwell_candidate(1_200, 7), &src, at(1_200));

        assert_eq!(d, Decision::Dispatched);
        assert!(job.is_none());
        assert!(arb.has_highlight());
    }

    #[test]
    fn test_exclusivity_checked_before_cooldown() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        // Fire hesitation, dismiss it, fire skim to occupy the overlay
        arb.on_candidate(&hesitation_candidate(0), &src, at(0));
        arb.dismiss_overlay();
        arb.on_candidate(&skim_candidate(1_000), &src, at(1_000));

        // This hesitation fails both exclusivity and cooldown; exclusivity
        // is the reported reason
        let (d, _) = arb.on_candidate(&hesitation_candidate(2_000), &src, at(2_000));
        assert_eq!(d, Decision::SuppressedOverlayActive);
    }

    #[test]
    fn test_hesitation_cooldown() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (d1, _) = arb.on_candidate(&hesitation_candidate(0), &src, at(0));
        assert_eq!(d1, Decision::Dispatched);
        arb.dismiss_overlay();

        let (d2, _) = arb.on_candidate(&hesitation_candidate(10_000), &src, at(10_000));
        assert_eq!(d2, Decision::SuppressedCooldown);

        let (d3, _) = arb.on_candidate(&hesitation_candidate(31_000), &src, at(31_000));
        assert_eq!(d3, Decision::Dispatched);
    }

    #[test]
    fn test_exit_once_per_session() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (d1, _) = arb.on_candidate(&exit_candidate(0), &src, at(0));
        assert_eq!(d1, Decision::Dispatched);
        assert!(arb.session_flags().exit_intervention_shown);
        arb.dismiss_overlay();

        let (d2, _) = arb.on_candidate(&exit_candidate(60_000), &src, at(60_000));
        assert_eq!(d2, Decision::SuppressedSession);
    }

    #[test]
    fn test_session_flags_injected() {
        let sink = MemorySink::new();
        let mut arb = Arbiter::new(
            ArbiterConfig::default(),
            LogPresenter,
            &sink,
            SessionFlags {
                exit_intervention_shown: true,
            },
        );
        let src = content();

        // The flag from a previous page load in this session still binds
        let (d, _) = arb.on_candidate(&exit_candidate(0), &src, at(0));
        assert_eq!(d, Decision::SuppressedSession);
    }

    #[test]
    fn test_stale_augmentation_dropped_after_dismissal() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (_, job) = arb.on_candidate(&skim_candidate(0), &src, at(0));
        let job = job.unwrap();
        arb.dismiss_overlay();

        // Must be a no-op: the overlay stays dismissed
        arb.complete_augmentation(&job, Augmentation::Summary("late".into()));
        assert!(arb.active_overlay().unwrap().dismissed);
    }

    #[test]
    fn test_stale_augmentation_dropped_after_replacement() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (_, job1) = arb.on_candidate(&skim_candidate(0), &src, at(0));
        arb.dismiss_overlay();
        let (_, job2) = arb.on_candidate(&exit_candidate(1_000), &src, at(1_000));

        // The first job's generation no longer matches
        arb.complete_augmentation(&job1.unwrap(), Augmentation::Summary("old".into()));
        arb.complete_augmentation(&job2.unwrap(), Augmentation::Summary("new".into()));
        assert_eq!(arb.active_overlay().unwrap().kind, IntentKind::ExitIntent);
    }

    #[test]
    fn test_unavailable_falls_back_to_truncated_excerpt() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (_, job) = arb.on_candidate(&skim_candidate(0), &src, at(0));
        let job = job.unwrap();
        assert!(!job.excerpt.is_empty());

        // Fallback content is derived from the job excerpt itself
        let expected = truncate_chars(job.excerpt.trim(), 280);
        assert_eq!(arb.fallback_excerpt(&job.excerpt), expected);
        arb.complete_augmentation(&job, Augmentation::Unavailable);
    }

    #[test]
    fn test_fallback_never_empty() {
        let sink = MemorySink::new();
        let arb = arbiter(&sink);
        assert_eq!(arb.fallback_excerpt(""), EMPTY_EXCERPT_FALLBACK);
        assert_eq!(arb.fallback_excerpt("   "), EMPTY_EXCERPT_FALLBACK);
    }

    #[test]
    fn test_highlight_clears_on_scroll() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        arb.on_candidate(&dwell_candidate(0, 3), &src, at(0));
        assert!(arb.has_highlight());

        arb.on_scroll();
        assert!(!arb.has_highlight());
    }

    #[test]
    fn test_highlight_auto_clears_on_deadline() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        arb.on_candidate(&dwell_candidate(0, 3), &src, at(0));
        arb.tick(at(2_999));
        assert!(arb.has_highlight());

        arb.tick(at(3_000));
        assert!(!arb.has_highlight());
    }

    #[test]
    fn test_highlight_persists_when_configured() {
        let sink = MemorySink::new();
        let mut arb = Arbiter::new(
            ArbiterConfig {
                hover_persist: Duration::ZERO,
                ..ArbiterConfig::default()
            },
            LogPresenter,
            &sink,
            SessionFlags::default(),
        );
        let src = content();

        arb.on_candidate(&dwell_candidate(0, 3), &src, at(0));
        arb.tick(at(100_000));
        assert!(arb.has_highlight());
    }

    #[test]
    fn test_every_decision_reaches_telemetry() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        arb.on_candidate(&skim_candidate(0), &src, at(0));
        arb.on_candidate(&exit_candidate(100), &src, at(100));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "rapid_skim_fired");
        assert_eq!(events[0].domain, "news.example.com");
        assert_eq!(events[1].event_type, "exit_intent_suppressed_overlay");
    }

    #[test]
    fn test_endpoint_per_kind() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (_, job) = arb.on_candidate(&skim_candidate(0), &src, at(0));
        assert_eq!(job.unwrap().endpoint, AugmentEndpoint::Summarize);
        arb.dismiss_overlay();

        let (_, job) = arb.on_candidate(&hesitation_candidate(1_000), &src, at(1_000));
        assert_eq!(job.unwrap().endpoint, AugmentEndpoint::Suggest);
    }

    #[test]
    fn test_related_result_renders_sidebar() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content();

        let (_, job) = arb.on_candidate(&skim_candidate(0), &src, at(0));
        arb.complete_augmentation(
            &job.unwrap(),
            Augmentation::Related(vec![crate::augment::RelatedArticle {
                title: "More".into(),
                url: "https://news.example.com/more".into(),
                image: None,
            }]),
        );
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://news.example.com/a/b?c=1"), "news.example.com");
        assert_eq!(domain_of("http://localhost:8000/api"), "localhost:8000");
        assert_eq!(domain_of("example.com/path"), "example.com");
    }

    #[test]
    fn test_theme_hint_forwarded() {
        let sink = MemorySink::new();
        let mut arb = arbiter(&sink);
        let src = content().with_theme(ThemeHint::Dark);

        let (d, _) = arb.on_candidate(&dwell_candidate(0, 1), &src, at(0));
        assert_eq!(d, Decision::Dispatched);
    }
}
