//! Section generation stage.
//!
//! Each README section is produced by rendering its template with the
//! appropriate variables and invoking the generation backend -- except the
//! file-structure and license sections, which are direct template fills with
//! no model call. Placeholder validation happens before any backend call, so
//! a missing variable can never reach the provider.

use std::collections::HashMap;

use tracing::debug;

use crate::backend::{with_backoff, GenerationRequest};
use crate::config::GenOptions;
use crate::error::{ReadmeError, Result};
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::template::TemplateSet;

/// One named, ordered block of the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Introduction,
    FileStructure,
    Installation,
    RepositoryOverview,
    License,
}

impl Section {
    /// The contract ordering of the full document. Assembly never reorders
    /// on its own; this is the default for
    /// [`GeneratorConfig::sections`](crate::config::GeneratorConfig).
    pub const DEFAULT_ORDER: [Section; 5] = [
        Section::Introduction,
        Section::FileStructure,
        Section::Installation,
        Section::RepositoryOverview,
        Section::License,
    ];

    /// Stable name, used in errors, events, and template lookup.
    pub fn name(&self) -> &'static str {
        match self {
            Section::Introduction => "introduction",
            Section::FileStructure => "file_structure",
            Section::Installation => "installation",
            Section::RepositoryOverview => "repository_overview",
            Section::License => "license",
        }
    }

    /// Whether this section is generated by the model. The rest are direct
    /// fills from repository data.
    pub fn is_generated(&self) -> bool {
        !matches!(self, Section::FileStructure | Section::License)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The generated text for one named section, before fence stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    pub section: Section,
    pub text: String,
}

/// Produces individual README sections against a shared [`ExecCtx`].
pub struct SectionWriter<'a> {
    ctx: &'a ExecCtx,
    templates: &'a TemplateSet,
    model: &'a str,
    gen: &'a GenOptions,
}

impl<'a> SectionWriter<'a> {
    pub fn new(
        ctx: &'a ExecCtx,
        templates: &'a TemplateSet,
        model: &'a str,
        gen: &'a GenOptions,
    ) -> Self {
        Self {
            ctx,
            templates,
            model,
            gen,
        }
    }

    /// Generate one section from the given variables.
    ///
    /// Variable requirements per section:
    ///
    /// | section | variables |
    /// |---|---|
    /// | `introduction` | `files_structure`, `files_summaries` |
    /// | `file_structure` | `folder_structure` (no model call) |
    /// | `installation` | `files_summaries`, `repository_url` |
    /// | `repository_overview` | `files_structure`, `files_summaries` |
    /// | `license` | `license_kind`, `license_link` (no model call) |
    ///
    /// A missing variable fails with [`ReadmeError::MissingVariable`] before
    /// the backend is invoked. A backend failure surfaces as
    /// [`ReadmeError::SectionFailed`] naming the section -- unlike per-file
    /// summaries, a missing top-level section is not acceptable degraded
    /// output.
    pub async fn generate(
        &self,
        section: Section,
        vars: &HashMap<String, String>,
    ) -> Result<RenderedSection> {
        self.ctx.check_cancelled()?;
        emit(
            &self.ctx.event_handler,
            Event::SectionStart { section: section.name().to_string() },
        );

        let text = match section {
            Section::FileStructure => {
                let tree = require_var(section, vars, "folder_structure")?;
                format!("# File Structure\n\n```\n{}\n```", tree)
            }
            Section::License => {
                let kind = require_var(section, vars, "license_kind")?;
                let link = require_var(section, vars, "license_link")?;
                format!("# License\n\n[{}]({})", kind, link)
            }
            _ => self.generate_with_model(section, vars).await?,
        };

        emit(
            &self.ctx.event_handler,
            Event::SectionDone { section: section.name().to_string() },
        );

        Ok(RenderedSection { section, text })
    }

    async fn generate_with_model(
        &self,
        section: Section,
        vars: &HashMap<String, String>,
    ) -> Result<String> {
        let template = self.templates.get(section.name())?;
        // Placeholder validation happens here, before the backend call.
        let prompt = template.render(vars)?;
        debug!(section = %section, prompt_bytes = prompt.len(), "generating section");

        let request = GenerationRequest {
            model: self.model.to_string(),
            system_prompt: None,
            prompt,
            options: self.gen.clone(),
        };

        let event_handler = self.ctx.event_handler.clone();
        let name = section.name().to_string();
        let mut on_retry = move |attempt: u32, delay: std::time::Duration, reason: &str| {
            emit(
                &event_handler,
                Event::TransportRetry {
                    name: name.clone(),
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                    reason: reason.to_string(),
                },
            );
        };

        let response = with_backoff(
            &self.ctx.backend,
            &self.ctx.client,
            &self.ctx.base_url,
            &request,
            &self.ctx.backoff,
            self.ctx.call_timeout,
            self.ctx.cancel_flag(),
            Some(&mut on_retry),
        )
        .await
        .map_err(|e| match e {
            e @ (ReadmeError::Cancelled | ReadmeError::Timeout) => e,
            other => ReadmeError::SectionFailed {
                section: section.name().to_string(),
                message: other.to_string(),
            },
        })?;

        Ok(response.text.trim().to_string())
    }
}

fn require_var(section: Section, vars: &HashMap<String, String>, key: &str) -> Result<String> {
    vars.get(key).cloned().ok_or_else(|| ReadmeError::MissingVariable {
        template: section.name().to_string(),
        variable: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::sync::Arc;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ctx_with(mock: Arc<MockBackend>) -> ExecCtx {
        ExecCtx::builder("http://unused").backend(mock).build()
    }

    #[tokio::test]
    async fn test_introduction_prompt_contains_inputs() {
        let mock = Arc::new(MockBackend::fixed("# Intro"));
        let ctx = ctx_with(mock.clone());
        let templates = TemplateSet::builtin();
        let gen = GenOptions::default();
        let writer = SectionWriter::new(&ctx, &templates, "test", &gen);

        let rendered = writer
            .generate(
                Section::Introduction,
                &vars(&[
                    ("files_structure", "Project file structure:\n- a.py\n- b.py"),
                    ("files_summaries", "Projects files contents summaries:\n- File: a.py\n- Contents: s"),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(rendered.text, "# Intro");
        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("- a.py"));
        assert!(prompt.contains("- b.py"));
        assert!(prompt.contains("- File: a.py"));
    }

    #[tokio::test]
    async fn test_missing_variable_is_fatal_and_local() {
        let mock = Arc::new(MockBackend::fixed("unused"));
        let ctx = ctx_with(mock.clone());
        let templates = TemplateSet::builtin();
        let gen = GenOptions::default();
        let writer = SectionWriter::new(&ctx, &templates, "test", &gen);

        // installation without repository_url
        let err = writer
            .generate(
                Section::Installation,
                &vars(&[("files_summaries", "whatever")]),
            )
            .await
            .unwrap_err();

        match err {
            ReadmeError::MissingVariable { template, variable } => {
                assert_eq!(template, "installation");
                assert_eq!(variable, "repository_url");
            }
            other => panic!("expected MissingVariable, got {:?}", other),
        }
        // The backend was never invoked.
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_license_section_needs_no_model_call() {
        let mock = Arc::new(MockBackend::fixed("unused").failing_on(""));
        let ctx = ctx_with(mock.clone());
        let templates = TemplateSet::builtin();
        let gen = GenOptions::default();
        let writer = SectionWriter::new(&ctx, &templates, "test", &gen);

        let rendered = writer
            .generate(
                Section::License,
                &vars(&[("license_kind", "MIT"), ("license_link", "LICENSE")]),
            )
            .await
            .unwrap();

        assert_eq!(rendered.text, "# License\n\n[MIT](LICENSE)");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_file_structure_section_direct_fill() {
        let mock = Arc::new(MockBackend::fixed("unused"));
        let ctx = ctx_with(mock.clone());
        let templates = TemplateSet::builtin();
        let gen = GenOptions::default();
        let writer = SectionWriter::new(&ctx, &templates, "test", &gen);

        let rendered = writer
            .generate(
                Section::FileStructure,
                &vars(&[("folder_structure", "src/\n    lib.rs")]),
            )
            .await
            .unwrap();

        assert_eq!(rendered.text, "# File Structure\n\n```\nsrc/\n    lib.rs\n```");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_names_section() {
        let mock = Arc::new(MockBackend::fixed("unused").failing_on("Installation"));
        let ctx = ctx_with(mock);
        let templates = TemplateSet::builtin();
        let gen = GenOptions::default();
        let writer = SectionWriter::new(&ctx, &templates, "test", &gen);

        let err = writer
            .generate(
                Section::Installation,
                &vars(&[
                    ("files_summaries", "s"),
                    ("repository_url", "https://example.com/x"),
                ]),
            )
            .await
            .unwrap_err();

        match err {
            ReadmeError::SectionFailed { section, .. } => assert_eq!(section, "installation"),
            other => panic!("expected SectionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_default_order() {
        assert_eq!(
            Section::DEFAULT_ORDER.map(|s| s.name()),
            ["introduction", "file_structure", "installation", "repository_overview", "license"]
        );
    }

    #[test]
    fn test_is_generated() {
        assert!(Section::Introduction.is_generated());
        assert!(Section::Installation.is_generated());
        assert!(Section::RepositoryOverview.is_generated());
        assert!(!Section::FileStructure.is_generated());
        assert!(!Section::License.is_generated());
    }
}
