//! Augmentation Service Client
//!
//! JSON-over-HTTP client for the enrichment endpoints. Each call either
//! returns usable content or the `Unavailable` sentinel; the engine's
//! fallback path (truncated local excerpt) handles the rest.

use super::retry::post_json_with_retry;
use super::{Augmentation, RelatedArticle};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// Enrichment service contract.
///
/// Implementations must be infallible at the type level: degraded service
/// is expressed as [`Augmentation::Unavailable`], never as an error.
pub trait AugmentClient {
    fn summarize(&self, text: &str) -> impl Future<Output = Augmentation> + Send;
    fn simplify(&self, text: &str) -> impl Future<Output = Augmentation> + Send;
    fn suggest(&self, text: &str) -> impl Future<Output = Augmentation> + Send;
    fn related(&self, url: &str) -> impl Future<Output = Augmentation> + Send;
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct UrlRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct SimplifyResponse {
    simplified: String,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    summary: String,
    suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    articles: Vec<RelatedArticle>,
}

/// HTTP client for the augmentation service.
pub struct HttpAugmentClient {
    base_url: String,
    client: reqwest::Client,
    max_attempts: u32,
}

impl HttpAugmentClient {
    /// Create a client against the service base URL (e.g.
    /// `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>, timeout_ms: u64, max_attempts: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            client,
            max_attempts,
        }
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Option<R> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let resp =
            post_json_with_retry(&self.client, &url, body, self.max_attempts, path).await?;
        match resp.json::<R>().await {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("{path}: response parse failed: {e}");
                None
            }
        }
    }
}

impl AugmentClient for HttpAugmentClient {
    async fn summarize(&self, text: &str) -> Augmentation {
        match self
            .post::<_, SummarizeResponse>("summarize", &TextRequest { text })
            .await
        {
            Some(r) => Augmentation::Summary(r.summary),
            None => Augmentation::Unavailable,
        }
    }

    async fn simplify(&self, text: &str) -> Augmentation {
        match self
            .post::<_, SimplifyResponse>("simplify", &TextRequest { text })
            .await
        {
            Some(r) => Augmentation::Simplified(r.simplified),
            None => Augmentation::Unavailable,
        }
    }

    async fn suggest(&self, text: &str) -> Augmentation {
        match self
            .post::<_, SuggestResponse>("suggest", &TextRequest { text })
            .await
        {
            Some(r) => Augmentation::Suggestions {
                summary: r.summary,
                suggestions: r.suggestions,
            },
            None => Augmentation::Unavailable,
        }
    }

    async fn related(&self, url: &str) -> Augmentation {
        match self
            .post::<_, RelatedResponse>("related", &UrlRequest { url })
            .await
        {
            Some(r) => Augmentation::Related(r.articles),
            None => Augmentation::Unavailable,
        }
    }
}
