//! Per-file summarization stage.
//!
//! Maps every readable repository file to a short generated summary, one
//! backend call per file. Files are processed concurrently up to a bounded
//! width, and results are merged back in file-listing order so the summary
//! mapping -- and everything rendered from it -- is deterministic.
//!
//! Failure policy: a failed summary excludes that one file and the run
//! continues. Partial README content beats total failure over a single
//! oversized or unlucky file. Failures are reported through `tracing` and
//! [`Event::SummaryFailed`], never as an error from this stage. Only
//! cancellation and template misuse (a missing placeholder, which is a
//! programming error) abort.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::backend::{with_backoff, GenerationRequest};
use crate::config::GenOptions;
use crate::error::{ReadmeError, Result};
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::template::Template;

/// A generated summary for one repository file.
///
/// Keyed by the file's relative path; exactly one entry exists per
/// successfully summarized file. Discarded when the run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Relative path of the source file.
    pub path: String,
    /// Short generated description of the file's contents.
    pub summary: String,
}

/// Summarize `files` (pairs of relative path and text content).
///
/// Up to `concurrency` backend calls run at once; the output preserves the
/// input order regardless of completion order. Entries whose summary failed
/// are absent from the output.
pub(crate) async fn summarize_files(
    ctx: &ExecCtx,
    template: &Template,
    model: &str,
    gen: &GenOptions,
    concurrency: usize,
    files: &[(String, String)],
) -> Result<Vec<FileSummary>> {
    let tasks = files.iter().enumerate().map(|(idx, (path, contents))| {
        let path = path.clone();
        async move {
            let result = summarize_one(ctx, template, model, gen, &path, contents).await;
            (idx, path, result)
        }
    });

    let mut outcomes: Vec<(usize, String, Result<String>)> = stream::iter(tasks)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    outcomes.sort_by_key(|(idx, _, _)| *idx);

    let mut summaries = Vec::new();
    for (_, path, result) in outcomes {
        match result {
            Ok(summary) => {
                emit(&ctx.event_handler, Event::SummaryDone { path: path.clone() });
                summaries.push(FileSummary { path, summary });
            }
            // These two abort the whole stage: cancellation is a caller
            // decision, a missing placeholder is a broken template contract.
            Err(e @ ReadmeError::Cancelled) => return Err(e),
            Err(e @ ReadmeError::MissingVariable { .. }) => return Err(e),
            Err(e) => {
                warn!(path = %path, error = %e, "summary generation failed, excluding file");
                emit(
                    &ctx.event_handler,
                    Event::SummaryFailed {
                        path,
                        reason: e.to_string(),
                    },
                );
            }
        }
    }

    Ok(summaries)
}

/// Generate the summary for a single file.
async fn summarize_one(
    ctx: &ExecCtx,
    template: &Template,
    model: &str,
    gen: &GenOptions,
    path: &str,
    contents: &str,
) -> Result<String> {
    ctx.check_cancelled()?;
    emit(
        &ctx.event_handler,
        Event::SummaryStart { path: path.to_string() },
    );
    debug!(path = %path, bytes = contents.len(), "summarizing file");

    let mut vars = HashMap::new();
    vars.insert("file_contents".to_string(), contents.to_string());
    let prompt = template.render(&vars)?;

    let request = GenerationRequest {
        model: model.to_string(),
        system_prompt: None,
        prompt,
        options: gen.clone(),
    };

    let event_handler = ctx.event_handler.clone();
    let retry_path = path.to_string();
    let mut on_retry = move |attempt: u32, delay: std::time::Duration, reason: &str| {
        emit(
            &event_handler,
            Event::TransportRetry {
                name: retry_path.clone(),
                attempt,
                delay_ms: delay.as_millis() as u64,
                reason: reason.to_string(),
            },
        );
    };

    let response = with_backoff(
        &ctx.backend,
        &ctx.client,
        &ctx.base_url,
        &request,
        &ctx.backoff,
        ctx.call_timeout,
        ctx.cancel_flag(),
        Some(&mut on_retry),
    )
    .await?;

    Ok(response.text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::template::TemplateSet;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn files(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    fn file_summary_template() -> Template {
        TemplateSet::builtin().get("file_summary").unwrap().clone()
    }

    #[tokio::test]
    async fn test_summarizes_all_files_in_order() {
        let mock = Arc::new(MockBackend::fixed("Summary of X"));
        let ctx = ExecCtx::builder("http://unused").backend(mock.clone()).build();

        let result = summarize_files(
            &ctx,
            &file_summary_template(),
            "test",
            &GenOptions::default(),
            2,
            &files(&[("a.py", "print(1)"), ("b.py", "print(2)")]),
        )
        .await
        .unwrap();

        assert_eq!(
            result,
            vec![
                FileSummary { path: "a.py".into(), summary: "Summary of X".into() },
                FileSummary { path: "b.py".into(), summary: "Summary of X".into() },
            ]
        );
        // Each file's contents reached the backend in its own prompt.
        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().any(|p| p.contains("print(1)")));
        assert!(prompts.iter().any(|p| p.contains("print(2)")));
    }

    #[tokio::test]
    async fn test_failed_file_excluded_run_continues() {
        let mock = Arc::new(MockBackend::fixed("ok").failing_on("print(2)"));
        let ctx = ExecCtx::builder("http://unused").backend(mock).build();

        let result = summarize_files(
            &ctx,
            &file_summary_template(),
            "test",
            &GenOptions::default(),
            2,
            &files(&[("a.py", "print(1)"), ("b.py", "print(2)"), ("c.py", "print(3)")]),
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].path, "a.py");
        assert_eq!(result[1].path, "c.py");
    }

    #[tokio::test]
    async fn test_failure_emits_event() {
        use crate::events::FnEventHandler;
        use std::sync::Mutex;

        let failed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let failed_clone = failed.clone();
        let handler = Arc::new(FnEventHandler(move |event: Event| {
            if let Event::SummaryFailed { path, .. } = event {
                failed_clone.lock().unwrap().push(path);
            }
        }));

        let mock = Arc::new(MockBackend::fixed("ok").failing_on("bad"));
        let ctx = ExecCtx::builder("http://unused")
            .backend(mock)
            .event_handler(handler)
            .build();

        summarize_files(
            &ctx,
            &file_summary_template(),
            "test",
            &GenOptions::default(),
            1,
            &files(&[("good.py", "fine"), ("bad.py", "bad")]),
        )
        .await
        .unwrap();

        assert_eq!(*failed.lock().unwrap(), vec!["bad.py"]);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_stage() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mock = Arc::new(MockBackend::fixed("ok"));
        let ctx = ExecCtx::builder("http://unused")
            .backend(mock)
            .cancellation(Some(cancel))
            .build();

        let err = summarize_files(
            &ctx,
            &file_summary_template(),
            "test",
            &GenOptions::default(),
            1,
            &files(&[("a.py", "x")]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReadmeError::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_file_set() {
        let mock = Arc::new(MockBackend::fixed("ok"));
        let ctx = ExecCtx::builder("http://unused").backend(mock.clone()).build();

        let result = summarize_files(
            &ctx,
            &file_summary_template(),
            "test",
            &GenOptions::default(),
            4,
            &[],
        )
        .await
        .unwrap();
        assert!(result.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_order_stable_under_concurrency() {
        let mock = Arc::new(MockBackend::new(vec![
            "s1".into(),
            "s2".into(),
            "s3".into(),
            "s4".into(),
        ]));
        let ctx = ExecCtx::builder("http://unused").backend(mock).build();

        let input = files(&[("d.py", "4"), ("a.py", "1"), ("c.py", "3"), ("b.py", "2")]);
        let result = summarize_files(
            &ctx,
            &file_summary_template(),
            "test",
            &GenOptions::default(),
            4,
            &input,
        )
        .await
        .unwrap();

        let paths: Vec<&str> = result.iter().map(|s| s.path.as_str()).collect();
        // Input order, not alphabetical and not completion order.
        assert_eq!(paths, vec!["d.py", "a.py", "c.py", "b.py"]);
    }
}
