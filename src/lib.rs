//! # Reader Intent
//!
//! A behavioral signal detection and intent arbitration engine for adaptive
//! reading surfaces.
//!
//! ## Overview
//!
//! This library consumes a stream of low-level reader interaction events
//! (pointer movement, scrolling, hover enter/leave, exit trajectories) and
//! converts the noisy, continuous stream into a small set of discrete,
//! debounced intent classifications: dwelling on content, skimming,
//! backtracking to re-read, hesitating, abandoning. Each classification is
//! arbitrated against mutual-exclusion, cooldown, and session-dedup policy
//! before it may dispatch a single visible intervention, optionally enriched
//! by a remote augmentation service.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reader_intent::app::config::EngineConfig;
//! use reader_intent::arbiter::SessionFlags;
//! use reader_intent::engine::IntentEngine;
//! use reader_intent::page::StaticContent;
//! use reader_intent::present::LogPresenter;
//! use reader_intent::signal::types::RawEvent;
//! use reader_intent::telemetry::NullSink;
//! use reader_intent::time::Timestamp;
//!
//! let config = EngineConfig::default();
//! let content = StaticContent::new("https://example.com/article", "Body text...");
//! let mut engine = IntentEngine::new(
//!     &config,
//!     LogPresenter::default(),
//!     NullSink,
//!     content,
//!     SessionFlags::default(),
//! );
//!
//! // Feed host events, stepping virtual time forward.
//! let jobs = engine.handle_event(RawEvent::scroll(Timestamp::from_millis(100), 240.0, 5000.0));
//! let more = engine.tick(Timestamp::from_millis(200));
//! # let _ = (jobs, more);
//! ```
//!
//! ## Architecture
//!
//! - [`time`]: millisecond timebase and cancellable deadline handles
//! - [`signal`]: sample normalization, rate limiting, sliding windows
//! - [`detect`]: the four stateful detectors (dwell, scroll, hesitation, exit)
//! - [`arbiter`]: intervention arbitration, cooldowns, session dedup
//! - [`augment`]: remote enrichment client with graceful degradation
//! - [`present`]: the presentation adapter contract implemented by hosts
//! - [`telemetry`]: fire-and-forget decision logging
//! - [`page`]: page content access contract implemented by hosts
//! - [`engine`]: pipeline wiring, trace capture, deterministic replay
//! - [`app`]: configuration and CLI
//!
//! ## Event Pipeline
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Host Event │───▶│   Sampler   │───▶│  Detectors  │───▶│   Arbiter   │
//! │  (raw)     │    │ (rate limit)│    │ (candidates)│    │ (decisions) │
//! └────────────┘    └─────────────┘    └─────────────┘    └──────┬──────┘
//!                                                                │
//!                                  ┌──────────────┬──────────────┤
//!                                  ▼              ▼              ▼
//!                           ┌────────────┐ ┌────────────┐ ┌────────────┐
//!                           │ Presenter  │ │  Augment   │ │ Telemetry  │
//!                           │  (render)  │ │  (enrich)  │ │  (record)  │
//!                           └────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! The engine core is synchronous and single-threaded; the only suspension
//! point is awaiting the augmentation client, and any state read after that
//! await is re-validated before use.

pub mod app;
pub mod arbiter;
pub mod augment;
pub mod detect;
pub mod engine;
pub mod page;
pub mod present;
pub mod signal;
pub mod telemetry;
pub mod time;

// Re-export commonly used types
pub use arbiter::{Arbiter, Decision, SessionFlags};
pub use detect::{CandidateIntent, Detector, IntentKind};
pub use engine::IntentEngine;
pub use signal::types::{RawEvent, Sample, TargetInfo};
pub use time::{Duration, Timestamp};

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Trace error: {0}")]
    Trace(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
