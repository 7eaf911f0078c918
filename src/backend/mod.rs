//! Generation backend trait and normalized request/response types.
//!
//! The [`GenerationBackend`] trait abstracts over text-generation providers,
//! translating between the normalized [`GenerationRequest`]/
//! [`GenerationResponse`] types and provider-specific HTTP APIs. The pipeline
//! treats the backend as an opaque completion function: rendered prompt in,
//! generated text out.
//!
//! ```text
//! SectionWriter ──► GenerationRequest ──► GenerationBackend::complete() ──► GenerationResponse
//!                                                  │
//!                                       ┌──────────┴──────────┐
//!                                 OllamaBackend          OpenAiBackend
//!                                /api/generate        /v1/chat/completions
//!                                /api/chat
//! ```

pub mod backoff;
pub mod mock;
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;

pub use backoff::BackoffConfig;
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
#[cfg(feature = "openai")]
pub use openai::OpenAiBackend;

use crate::config::GenOptions;
use crate::error::{ReadmeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Type alias for the callback invoked before each transport retry.
///
/// Arguments: `(attempt_number, delay_before_retry, reason_for_retry)`.
pub type RetryCallback<'a> = Option<&'a mut (dyn FnMut(u32, Duration, &str) + Send)>;

/// A normalized generation request -- provider-agnostic.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier (e.g. `"llama3.2:3b"`, `"gpt-4o-mini"`).
    pub model: String,

    /// If `Some`, this is a chat-style call with a system prompt.
    pub system_prompt: Option<String>,

    /// The rendered prompt text.
    pub prompt: String,

    /// Generation options (temperature, max tokens, custom options).
    pub options: GenOptions,
}

/// A normalized generation response.
#[derive(Debug)]
pub struct GenerationResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token counts, timing, model info).
    /// Stored as raw JSON -- each provider returns different fields.
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over text-generation providers.
///
/// Implementors translate between the normalized request/response pair and
/// the provider's HTTP API. Stateless and safe for concurrent invocation by
/// multiple summarization workers.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as
/// `Arc<dyn GenerationBackend>`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Execute a generation call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Check whether a [`ReadmeError`] is retryable based on the backoff config.
///
/// Retryable conditions:
/// - [`ReadmeError::HttpError`] with a status in `config.retryable_statuses`
/// - [`ReadmeError::Request`] (connection/transport errors)
pub fn is_retryable(error: &ReadmeError, config: &BackoffConfig) -> bool {
    match error {
        ReadmeError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        ReadmeError::Request(_) => true,
        _ => false,
    }
}

/// Execute a backend call with transport-level retry and exponential backoff.
///
/// Wraps [`GenerationBackend::complete`] with automatic retry on transient
/// failures (429, 5xx, connection errors). Each attempt is bounded by
/// `call_timeout` when set, surfacing [`ReadmeError::Timeout`] rather than
/// hanging on a stalled provider.
///
/// Returns the first successful response, or the last error if all retries
/// are exhausted.
///
/// # Arguments
///
/// * `backend` -- The generation backend to call
/// * `client` -- HTTP client for making requests
/// * `base_url` -- Base URL for the API
/// * `request` -- The normalized generation request
/// * `config` -- Backoff configuration
/// * `call_timeout` -- Optional per-attempt deadline
/// * `cancel` -- Optional cancellation flag
/// * `on_retry` -- Optional callback invoked before each retry with (attempt, delay, reason)
#[allow(clippy::too_many_arguments)]
pub async fn with_backoff(
    backend: &Arc<dyn GenerationBackend>,
    client: &Client,
    base_url: &str,
    request: &GenerationRequest,
    config: &BackoffConfig,
    call_timeout: Option<Duration>,
    cancel: Option<&std::sync::atomic::AtomicBool>,
    mut on_retry: RetryCallback<'_>,
) -> Result<GenerationResponse> {
    let mut last_error: Option<ReadmeError> = None;

    for attempt in 0..=config.max_retries {
        // Check cancellation
        if let Some(flag) = cancel {
            if flag.load(std::sync::atomic::Ordering::Relaxed) {
                return Err(ReadmeError::Cancelled);
            }
        }

        // Wait for backoff delay (not on first attempt)
        if attempt > 0 {
            let delay = if let Some(ReadmeError::HttpError {
                retry_after: Some(ra),
                ..
            }) = &last_error
            {
                if config.respect_retry_after {
                    *ra
                } else {
                    config.delay_for_attempt(attempt - 1)
                }
            } else {
                config.delay_for_attempt(attempt - 1)
            };

            let reason = last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();

            if let Some(ref mut cb) = on_retry {
                cb(attempt, delay, &reason);
            }

            tokio::time::sleep(delay).await;

            // Check cancellation after sleep
            if let Some(flag) = cancel {
                if flag.load(std::sync::atomic::Ordering::Relaxed) {
                    return Err(ReadmeError::Cancelled);
                }
            }
        }

        let outcome = match call_timeout {
            Some(limit) => match tokio::time::timeout(
                limit,
                backend.complete(client, base_url, request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ReadmeError::Timeout),
            },
            None => backend.complete(client, base_url, request).await,
        };

        match outcome {
            Ok(response) => return Ok(response),
            Err(e) => {
                if attempt < config.max_retries && is_retryable(&e, config) {
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    // Should not reach here, but just in case
    Err(last_error.unwrap_or(ReadmeError::Other(
        "backoff loop exited unexpectedly".into(),
    )))
}
