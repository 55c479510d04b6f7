//! Content Augmentation
//!
//! Client for the remote enrichment service (summaries, simplifications,
//! suggestions, related articles). Every failure path collapses to the
//! [`Augmentation::Unavailable`] sentinel; nothing here ever returns an
//! error to the engine.

pub mod client;
pub mod retry;

pub use client::{AugmentClient, HttpAugmentClient};

use serde::{Deserialize, Serialize};

/// Enrichment endpoints the arbiter can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentEndpoint {
    Summarize,
    Simplify,
    Suggest,
    Related,
}

impl AugmentEndpoint {
    /// URL path segment under the service base.
    pub fn path(&self) -> &'static str {
        match self {
            AugmentEndpoint::Summarize => "summarize",
            AugmentEndpoint::Simplify => "simplify",
            AugmentEndpoint::Suggest => "suggest",
            AugmentEndpoint::Related => "related",
        }
    }
}

/// A related article returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Enrichment result, including the unavailable sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Augmentation {
    Summary(String),
    Simplified(String),
    Suggestions {
        summary: String,
        suggestions: Vec<String>,
    },
    Related(Vec<RelatedArticle>),
    /// Network or parse failure; callers fall back to local content
    Unavailable,
}

impl Augmentation {
    /// Whether the service produced usable content.
    pub fn is_available(&self) -> bool {
        !matches!(self, Augmentation::Unavailable)
    }
}
