//! Page Content Access
//!
//! The arbiter sources intervention text (a hovered element's text, a
//! visible-page excerpt) through this contract instead of holding any
//! page references itself. Hosts back it with the live document; replay
//! and tests back it with a captured snapshot.

use crate::present::ThemeHint;
use crate::signal::types::TargetId;

/// Read access to the displayed page's content.
pub trait ContentSource {
    /// Text of a tracked element, if the host still knows it.
    fn target_text(&self, target: TargetId) -> Option<String>;

    /// A prefix of the page's visible text, at most `max_chars` characters.
    fn visible_text(&self, max_chars: usize) -> String;

    /// The page URL, for related-content lookups and telemetry.
    fn page_url(&self) -> String;

    /// Contrast hint for highlighting `target`, from its effective
    /// background.
    fn theme_hint(&self, target: TargetId) -> ThemeHint;
}

/// Content source over a captured page snapshot.
pub struct StaticContent {
    url: String,
    text: String,
    theme: ThemeHint,
}

impl StaticContent {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            theme: ThemeHint::Light,
        }
    }

    pub fn with_theme(mut self, theme: ThemeHint) -> Self {
        self.theme = theme;
        self
    }
}

impl ContentSource for StaticContent {
    fn target_text(&self, _target: TargetId) -> Option<String> {
        // A snapshot has no per-element text; fall back to the page prefix
        Some(truncate_chars(&self.text, 400))
    }

    fn visible_text(&self, max_chars: usize) -> String {
        truncate_chars(&self.text, max_chars)
    }

    fn page_url(&self) -> String {
        self.url.clone()
    }

    fn theme_hint(&self, _target: TargetId) -> ThemeHint {
        self.theme
    }
}

/// Char-boundary-safe prefix of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
