//! Event system for pipeline lifecycle hooks.
//!
//! Provides an optional, non-intrusive way to observe a README generation
//! run. The orchestrator and stages emit events as files are summarized and
//! sections are generated. Users can implement [`EventHandler`] to receive
//! these events for progress bars, logging, or streaming UIs; events are
//! observability only and never affect control flow.

use std::sync::Arc;

/// Events emitted during a README generation run.
#[derive(Debug, Clone)]
pub enum Event {
    /// A run has started.
    RunStart {
        /// Repository URL the run was invoked for.
        repo_url: String,
    },
    /// The repository listing completed.
    FilesListed {
        /// Number of files found.
        total: usize,
    },
    /// Summarization of one file is starting.
    SummaryStart {
        /// Relative path of the file.
        path: String,
    },
    /// One file was summarized successfully.
    SummaryDone {
        /// Relative path of the file.
        path: String,
    },
    /// Summarizing one file failed; the file is excluded and the run continues.
    SummaryFailed {
        /// Relative path of the file.
        path: String,
        /// Why the summary failed.
        reason: String,
    },
    /// Generation of one section is starting.
    SectionStart {
        /// Section name (e.g. `"introduction"`).
        section: String,
    },
    /// One section finished generating.
    SectionDone {
        /// Section name.
        section: String,
    },
    /// A transport-level retry due to an HTTP error.
    TransportRetry {
        /// Operation description (file path or section name).
        name: String,
        /// The retry attempt number (1-indexed).
        attempt: u32,
        /// Delay before this retry attempt in milliseconds.
        delay_ms: u64,
        /// Reason for the retry (error description).
        reason: String,
    },
    /// The run has finished.
    RunEnd {
        /// Whether the run produced a document.
        ok: bool,
    },
}

/// Handler for pipeline lifecycle events.
///
/// Implement this trait to receive progress updates during a run. This is
/// entirely optional -- the pipeline works without an event handler.
///
/// # Example
///
/// ```
/// use readmaker::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::SummaryStart { path } => println!("Summarizing file: {}", path),
///             Event::SectionStart { section } => println!("Generating section: {}", section),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when the pipeline emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use readmaker::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::SummaryFailed { path, reason } = event {
///         eprintln!("skipping {}: {}", path, reason);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
