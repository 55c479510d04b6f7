//! Arbiter-owned state records

use crate::detect::IntentKind;
use crate::signal::types::TargetInfo;
use crate::time::{Deadline, Timestamp};
use serde::{Deserialize, Serialize};

/// The overlay intervention currently on screen, if any.
///
/// At most one overlay-category intervention is active at a time; the
/// generation number ties asynchronous enrichment results back to the
/// dispatch that requested them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterventionRecord {
    /// Intent that dispatched this intervention
    pub kind: IntentKind,
    /// Dispatch time
    pub started_at: Timestamp,
    /// Whether the reader has dismissed it
    pub dismissed: bool,
    /// Dispatch generation, monotonically increasing per overlay
    pub generation: u64,
}

/// The inline highlight currently painted, if any.
///
/// Highlights are exempt from overlay exclusion; they clear on their own
/// deadline or on the next scroll, whichever comes first.
#[derive(Debug, Clone)]
pub struct HighlightRecord {
    /// Highlighted element
    pub target: TargetInfo,
    /// Auto-clear deadline (disarmed when persistence is indefinite)
    pub clear_timer: Deadline,
}

/// Page-visit-scoped flags that survive reloads within one browsing
/// session. The host constructs them (e.g. from session storage) and
/// passes them in; the arbiter is their sole owner afterward, so tests
/// construct arbiters with controlled flags instead of touching ambient
/// globals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFlags {
    /// The exit intervention was already shown (or dismissed) this session
    pub exit_intervention_shown: bool,
}
