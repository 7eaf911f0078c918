//! Mock backend for testing without a live model.
//!
//! [`MockBackend`] returns pre-configured responses in order, records every
//! prompt it receives, and can inject failures. This lets the pipeline's
//! tests assert both the documents produced and the exact prompts sent --
//! including that no call happened at all.
//!
//! # Example
//!
//! ```
//! use readmaker::backend::MockBackend;
//!
//! let mock = MockBackend::fixed("Summary of X");
//! ```

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{GenerationBackend, GenerationRequest, GenerationResponse};
use crate::error::{ReadmeError, Result};

/// A test backend with canned responses, prompt recording, and failure injection.
///
/// Responses are returned in order and cycle back to the beginning when
/// exhausted.
#[derive(Debug)]
pub struct MockBackend {
    responses: Vec<String>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    /// Fail the next N calls with this HTTP status before succeeding.
    fail_first: AtomicU32,
    fail_status: u16,
    /// Fail any call whose prompt contains this substring.
    fail_on_substring: Option<String>,
}

impl MockBackend {
    /// Create a mock backend with the given canned responses.
    pub fn new(responses: Vec<String>) -> Self {
        assert!(
            !responses.is_empty(),
            "MockBackend requires at least one response"
        );
        Self {
            responses,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            fail_first: AtomicU32::new(0),
            fail_status: 500,
            fail_on_substring: None,
        }
    }

    /// Create a mock that always returns the same response.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Fail the first `n` calls with the given HTTP status, then succeed.
    ///
    /// Useful for exercising the transport retry path.
    pub fn failing_first(mut self, n: u32, status: u16) -> Self {
        self.fail_first = AtomicU32::new(n);
        self.fail_status = status;
        self
    }

    /// Fail any call whose rendered prompt contains `needle`.
    ///
    /// Useful for simulating a model that chokes on one specific file.
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on_substring = Some(needle.into());
        self
    }

    /// All prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls made so far (including failed ones).
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn next_response(&self) -> String {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        self.responses[idx].clone()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if let Some(ref needle) = self.fail_on_substring {
            if request.prompt.contains(needle) {
                return Err(ReadmeError::Other(format!(
                    "mock failure: prompt contains '{}'",
                    needle
                )));
            }
        }

        let remaining = self.fail_first.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::Relaxed);
            return Err(ReadmeError::HttpError {
                status: self.fail_status,
                body: "mock transient failure".into(),
                retry_after: None,
            });
        }

        Ok(GenerationResponse {
            text: self.next_response(),
            status: 200,
            metadata: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
