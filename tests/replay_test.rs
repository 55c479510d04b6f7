//! Trace capture and deterministic replay
//!
//! Builds a synthetic session, round-trips it through the trace format,
//! and verifies replay reproduces the same decisions on every run.

use reader_intent::app::config::EngineConfig;
use reader_intent::arbiter::SessionFlags;
use reader_intent::augment::{AugmentClient, Augmentation};
use reader_intent::engine::{replay, ReplayOptions, ReplaySummary, Trace};
use reader_intent::page::StaticContent;
use reader_intent::present::LogPresenter;
use reader_intent::signal::types::{RawEvent, TargetId, TargetInfo, TargetRegion};
use reader_intent::telemetry::MemorySink;
use reader_intent::time::Timestamp;
use reader_intent::IntentEngine;

struct StubClient;

impl AugmentClient for StubClient {
    async fn summarize(&self, _text: &str) -> Augmentation {
        Augmentation::Summary("stub".to_string())
    }

    async fn simplify(&self, _text: &str) -> Augmentation {
        Augmentation::Simplified("stub".to_string())
    }

    async fn suggest(&self, _text: &str) -> Augmentation {
        Augmentation::Unavailable
    }

    async fn related(&self, _url: &str) -> Augmentation {
        Augmentation::Unavailable
    }
}

fn at(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

/// A session that dwells on a paragraph, skims hard, and finally exits.
fn session_trace() -> Trace {
    let mut trace = Trace::new(
        "dwell-skim-exit",
        "https://news.example.com/long-read",
        "A long-form article body used as the replay page snapshot.",
    );

    let paragraph = TargetInfo {
        id: TargetId(11),
        width: 620.0,
        height: 140.0,
        region: TargetRegion::Content,
        text_len: 540,
    };

    // Dwell: hover at t=0, no leave until 2.5s (dwell fires at 1.5s)
    trace.add_event(RawEvent::hover_enter(at(0), paragraph));
    trace.add_event(RawEvent::hover_leave(at(2_500), paragraph.id));

    // Skim burst: four fast samples 150ms apart
    for i in 0..4u64 {
        trace.add_event(RawEvent::scroll(
            at(3_000 + i * 150),
            (i as f64) * 250.0,
            9_000.0,
        ));
    }

    // Exit toward the top
    trace.add_event(RawEvent::pointer_exit_top(at(4_500), 12.0));

    trace.finalize();
    trace
}

async fn run_once(offline: bool) -> ReplaySummary {
    let trace = session_trace();
    let sink = MemorySink::new();
    let mut engine = IntentEngine::new(
        &EngineConfig::default(),
        LogPresenter,
        &sink,
        StaticContent::new(trace.page.url.clone(), trace.page.text.clone()),
        SessionFlags::default(),
    );

    replay(
        &trace,
        &mut engine,
        &StubClient,
        &sink,
        ReplayOptions {
            offline,
            ..ReplayOptions::default()
        },
    )
    .await
}

#[tokio::test]
async fn test_replay_fires_expected_intents() {
    let summary = run_once(false).await;

    assert_eq!(summary.events, 7);
    assert_eq!(summary.decisions.get("hover_dwell_fired"), Some(&1));
    assert_eq!(summary.decisions.get("rapid_skim_fired"), Some(&1));
    // The exit at 4.5s arrives with the skim overlay still active
    assert_eq!(
        summary.decisions.get("exit_intent_suppressed_overlay"),
        Some(&1)
    );
    // One enrichment job from the skim dispatch
    assert_eq!(summary.jobs, 1);
    assert_eq!(summary.resolved, 1);
}

#[tokio::test]
async fn test_replay_is_deterministic() {
    let a = run_once(false).await;
    let b = run_once(false).await;

    assert_eq!(a.events, b.events);
    assert_eq!(a.jobs, b.jobs);
    assert_eq!(a.decisions, b.decisions);
}

#[tokio::test]
async fn test_offline_replay_skips_resolution() {
    let summary = run_once(true).await;

    assert_eq!(summary.jobs, 1);
    assert_eq!(summary.resolved, 0);
    // Decisions are unaffected by skipping enrichment
    assert_eq!(summary.decisions.get("rapid_skim_fired"), Some(&1));
}

#[tokio::test]
async fn test_trace_file_roundtrip_replays_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");

    let trace = session_trace();
    trace.save(&path).expect("save");
    let loaded = Trace::load(&path).expect("load");

    let sink = MemorySink::new();
    let mut engine = IntentEngine::new(
        &EngineConfig::default(),
        LogPresenter,
        &sink,
        StaticContent::new(loaded.page.url.clone(), loaded.page.text.clone()),
        SessionFlags::default(),
    );
    let summary = replay(
        &loaded,
        &mut engine,
        &StubClient,
        &sink,
        ReplayOptions::default(),
    )
    .await;

    let direct = run_once(false).await;
    assert_eq!(summary.decisions, direct.decisions);
}

#[tokio::test]
async fn test_empty_trace_replays_cleanly() {
    let mut trace = Trace::new("empty", "https://example.com", "");
    trace.finalize();

    let sink = MemorySink::new();
    let mut engine = IntentEngine::new(
        &EngineConfig::default(),
        LogPresenter,
        &sink,
        StaticContent::new("https://example.com", ""),
        SessionFlags::default(),
    );
    let summary = replay(
        &trace,
        &mut engine,
        &StubClient,
        &sink,
        ReplayOptions::default(),
    )
    .await;

    assert_eq!(summary.events, 0);
    assert_eq!(summary.jobs, 0);
    assert!(summary.decisions.is_empty());
}
