//! HTTP retry with exponential backoff
//!
//! Shared by the augmentation client. Rate limiting (429) backs off
//! longer than transient server errors (5xx) and network failures; other
//! 4xx responses are non-retriable and give up immediately.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::warn;

/// POST a JSON body, retrying transient failures.
///
/// Returns `Some(Response)` only for a success status; `None` once
/// retries are exhausted or a non-retriable error occurs.
pub async fn post_json_with_retry<B: Serialize>(
    client: &Client,
    url: &str,
    body: &B,
    max_attempts: u32,
    context: &str,
) -> Option<Response> {
    for attempt in 0..max_attempts {
        match client.post(url).json(body).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return Some(resp);
                } else if status == StatusCode::TOO_MANY_REQUESTS {
                    let delay = std::time::Duration::from_secs(2u64.pow(attempt + 1));
                    warn!("{context}: rate limited (429), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                } else if status.is_server_error() {
                    let delay = std::time::Duration::from_secs(2u64.pow(attempt));
                    warn!("{context}: server error ({status}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                } else {
                    warn!("{context}: non-retriable error ({status})");
                    return None;
                }
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                let delay = std::time::Duration::from_secs(2u64.pow(attempt));
                warn!("{context}: network error ({e}), retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!("{context}: request failed: {e}");
                return None;
            }
        }
    }

    warn!("{context}: failed after {max_attempts} attempts");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_attempts_returns_none() {
        let client = Client::new();
        let result =
            post_json_with_retry(&client, "http://127.0.0.1:1/", &serde_json::json!({}), 0, "test")
                .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_exhausts_attempts() {
        // Port 1 refuses connections; one attempt, one backoff, then None
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(500))
            .build()
            .unwrap();

        let result = post_json_with_retry(
            &client,
            "http://127.0.0.1:1/summarize",
            &serde_json::json!({ "text": "t" }),
            1,
            "retry-test",
        )
        .await;
        assert!(result.is_none());
    }
}
