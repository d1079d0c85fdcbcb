//! Upstream clients: the arXiv Atom feed and an OpenAI-compatible chat API.
//!
//! Both sit behind small traits so the pipeline can be driven by mocks:
//! - [`PaperSource`] yields the day's papers
//! - [`CompletionProvider`] turns one prompt into one completion
//!
//! The HTTP implementations share the same stack: pooled reqwest client, retry
//! middleware for transient failures, and explicit status mapping into
//! [`ClientError`](crate::error::ClientError).

mod arxiv;
mod openai;

pub use arxiv::ArxivClient;
pub use openai::{ChatSettings, OpenAiClient};

use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::models::PaperRecord;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Source of the papers to digest.
#[async_trait::async_trait]
pub trait PaperSource: Send + Sync {
    /// Fetch the current set of papers, unique by url.
    async fn fetch_papers(&self) -> ClientResult<Vec<PaperRecord>>;
}

/// Single-shot text completion.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt` and return the generated text.
    async fn complete(&self, prompt: &str) -> ClientResult<String>;
}

/// Adapts a synchronous closure into a [`CompletionProvider`].
///
/// Handy for tests and for offline runs that echo or template their input.
pub struct FnProvider<F>(pub F);

#[async_trait::async_trait]
impl<F> CompletionProvider for FnProvider<F>
where
    F: Fn(&str) -> ClientResult<String> + Send + Sync,
{
    async fn complete(&self, prompt: &str) -> ClientResult<String> {
        (self.0)(prompt)
    }
}

impl<F> std::fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

/// Send `request` and map the outcome into the client error space.
///
/// A request that ran out of `timeout` becomes [`ClientError::Timeout`] once the
/// retry middleware has given up on it.
async fn send(
    request: reqwest_middleware::RequestBuilder,
    timeout: Duration,
) -> ClientResult<reqwest::Response> {
    match request.send().await {
        Ok(response) => handle_response(response).await,
        Err(reqwest_middleware::Error::Reqwest(e)) if e.is_timeout() => {
            Err(ClientError::Timeout(timeout))
        }
        Err(e) => Err(e.into()),
    }
}

/// Map a non-success status to a typed error, passing successes through.
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            Err(ClientError::rate_limited(retry_after))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        401 | 403 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::unauthorized(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_provider_forwards_prompt() {
        let provider =
            FnProvider(|prompt: &str| -> ClientResult<String> { Ok(prompt.to_uppercase()) });
        assert_eq!(provider.complete("hello").await.unwrap(), "HELLO");
    }

    #[tokio::test]
    async fn test_fn_provider_forwards_errors() {
        let provider =
            FnProvider(|_: &str| -> ClientResult<String> { Err(ClientError::EmptyCompletion) });
        assert!(matches!(
            provider.complete("x").await,
            Err(ClientError::EmptyCompletion)
        ));
    }
}
