use std::time::Duration;
use thiserror::Error;

/// Errors produced by the README pipeline and its components.
///
/// Two failure classes never appear here from the caller's point of view:
/// unreadable individual files and failed per-file summaries. Both are
/// absorbed by the summarization stage (the file is excluded and the failure
/// is reported via `tracing` and [`Event`](crate::events::Event)).
#[derive(Error, Debug)]
pub enum ReadmeError {
    /// The repository could not be listed or scanned at all.
    #[error("Repository at '{path}' is unreadable: {message}")]
    RepositoryUnreadable { path: String, message: String },

    /// A required prompt template was missing when the set was loaded.
    #[error("Template '{0}' not found in template set")]
    TemplateNotFound(String),

    /// A template was rendered without one of its required placeholders.
    /// This is a programming error and is raised before any backend call.
    #[error("Template '{template}' is missing variable '{variable}'")]
    MissingVariable { template: String, variable: String },

    /// The generation backend failed for a required README section.
    #[error("Section '{section}' failed: {message}")]
    SectionFailed { section: String, message: String },

    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`GenerationBackend`](crate::backend::GenerationBackend)
    /// implementations when the provider returns a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// A per-call timeout or the overall run deadline elapsed.
    #[error("Generation call timed out")]
    Timeout,

    /// The run was cancelled via the cancellation flag.
    #[error("Run was cancelled")]
    Cancelled,

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ReadmeError {
    fn from(err: anyhow::Error) -> Self {
        ReadmeError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReadmeError>;
