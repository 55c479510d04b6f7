//! Presentation Adapter Contract
//!
//! The arbiter never paints anything; it renders and removes intervention
//! artifacts exclusively through this contract, implemented by the host
//! (a page overlay layer, a test double, or the replay logger).

use crate::signal::types::TargetInfo;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Contrast hint for inline highlights, derived from the effective
/// background of the highlighted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeHint {
    Light,
    Dark,
}

/// Overlay artifact families the arbiter can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Key-takeaways box shown to skimmers
    Takeaways,
    /// Simplified-content box shown on backtracking
    Reread,
    /// Help bubble shown on hesitation
    Suggestion,
    /// Abandonment prompt, parameterized by reading progress
    ExitPrompt,
}

/// A sidebar entry (related content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarItem {
    pub title: String,
    pub url: String,
    pub image: Option<String>,
}

/// Rendering surface for interventions.
///
/// Implementations must tolerate redundant calls (removing an absent
/// highlight, dismissing an absent overlay) without failing: the arbiter
/// guarantees ordering within one callback but the host page can mutate
/// underneath at any time.
pub trait PresentationAdapter {
    /// Paint an inline highlight on `target`.
    fn apply_highlight(&mut self, target: &TargetInfo, theme: ThemeHint);

    /// Remove the inline highlight from `target`.
    fn remove_highlight(&mut self, target: &TargetInfo);

    /// Render an overlay, optionally in a loading state pending enrichment.
    fn show_overlay(&mut self, kind: OverlayKind, content: &str, is_loading: bool);

    /// Replace the active overlay's content with enrichment results.
    fn update_overlay(&mut self, content: &str, suggestions: &[String]);

    /// Remove the active overlay.
    fn dismiss_overlay(&mut self);

    /// Render the related-content sidebar.
    fn show_sidebar(&mut self, items: &[SidebarItem]);
}

/// Presentation adapter that renders every call as a log line.
///
/// Used by trace replay so a captured session can be inspected without a
/// live page.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl PresentationAdapter for LogPresenter {
    fn apply_highlight(&mut self, target: &TargetInfo, theme: ThemeHint) {
        info!(target = target.id.0, ?theme, "present: highlight");
    }

    fn remove_highlight(&mut self, target: &TargetInfo) {
        info!(target = target.id.0, "present: highlight removed");
    }

    fn show_overlay(&mut self, kind: OverlayKind, content: &str, is_loading: bool) {
        info!(?kind, is_loading, content_len = content.len(), "present: overlay");
    }

    fn update_overlay(&mut self, content: &str, suggestions: &[String]) {
        info!(
            content_len = content.len(),
            suggestions = suggestions.len(),
            "present: overlay updated"
        );
    }

    fn dismiss_overlay(&mut self) {
        info!("present: overlay dismissed");
    }

    fn show_sidebar(&mut self, items: &[SidebarItem]) {
        info!(items = items.len(), "present: sidebar");
    }
}
