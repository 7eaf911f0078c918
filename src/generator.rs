//! README generation orchestrator.
//!
//! [`ReadmeGenerator`] ties the stages together: scan the repository, build
//! the aggregate prompt inputs, summarize every readable file, generate each
//! configured section, and assemble the final document. The orchestrator owns
//! sequencing and the error policy; the stages own their own mechanics.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assemble::assemble;
use crate::config::GeneratorConfig;
use crate::error::{ReadmeError, Result};
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::prompt::{files_structure_text, files_summaries_text};
use crate::repository::RepositorySource;
use crate::section::{RenderedSection, Section, SectionWriter};
use crate::summarize::summarize_files;
use crate::template::TemplateSet;

/// Generates a complete README for one repository.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use readmaker::{ExecCtx, GeneratorConfig, LocalRepository, ReadmeGenerator, TemplateSet};
///
/// # async fn run() -> readmaker::Result<()> {
/// let repo = Arc::new(LocalRepository::new(
///     "https://github.com/owner/project",
///     "/tmp/checkout",
/// ));
/// let ctx = ExecCtx::builder("http://localhost:11434").build();
/// let generator = ReadmeGenerator::new(repo, TemplateSet::builtin(), ctx, GeneratorConfig::default());
/// let readme = generator.generate_readme().await?;
/// # Ok(())
/// # }
/// ```
pub struct ReadmeGenerator {
    repo: Arc<dyn RepositorySource>,
    templates: TemplateSet,
    ctx: ExecCtx,
    config: GeneratorConfig,
}

impl ReadmeGenerator {
    pub fn new(
        repo: Arc<dyn RepositorySource>,
        templates: TemplateSet,
        ctx: ExecCtx,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            repo,
            templates,
            ctx,
            config,
        }
    }

    /// The repository's existing README, if it has one. Callers that write
    /// the result to disk can use this to warn before overwriting.
    pub fn existing_readme(&self) -> Option<String> {
        self.repo.readme()
    }

    /// Run the full pipeline and return the assembled document.
    ///
    /// Fails fast on an unreadable repository, a failed section, or a missing
    /// template variable. A failed per-file summary only excludes that file.
    pub async fn generate_readme(&self) -> Result<String> {
        emit(
            &self.ctx.event_handler,
            Event::RunStart { repo_url: self.repo.repo_url().to_string() },
        );

        let result = match self.config.run_deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run())
                .await
                .unwrap_or(Err(ReadmeError::Timeout)),
            None => self.run().await,
        };

        emit(&self.ctx.event_handler, Event::RunEnd { ok: result.is_ok() });
        result
    }

    async fn run(&self) -> Result<String> {
        let files = self.repo.list_files()?;
        emit(&self.ctx.event_handler, Event::FilesListed { total: files.len() });
        info!(repo_url = self.repo.repo_url(), files = files.len(), "scanned repository");

        // The structure aggregate covers the whole listing; summarization only
        // covers files that yield text and fit the size cap.
        let structure = files_structure_text(&files);

        let mut readable: Vec<(String, String)> = Vec::new();
        for path in &files {
            let Some(contents) = self.repo.read_file(path) else {
                continue;
            };
            if contents.len() as u64 > self.config.max_file_bytes {
                debug!(path, bytes = contents.len(), "skipping oversized file");
                continue;
            }
            readable.push((path.clone(), contents));
        }

        let summaries = summarize_files(
            &self.ctx,
            self.templates.get("file_summary")?,
            &self.config.model,
            &self.config.gen,
            self.config.summary_concurrency,
            &readable,
        )
        .await?;
        if summaries.len() < readable.len() {
            warn!(
                failed = readable.len() - summaries.len(),
                "some files were excluded from the summary aggregate"
            );
        }
        let summaries_text = files_summaries_text(&summaries);

        let mut vars = HashMap::new();
        vars.insert("files_structure".to_string(), structure);
        vars.insert("files_summaries".to_string(), summaries_text);
        vars.insert(
            "repository_url".to_string(),
            self.repo.repo_url().to_string(),
        );

        let writer = SectionWriter::new(
            &self.ctx,
            &self.templates,
            &self.config.model,
            &self.config.gen,
        );

        let mut rendered: Vec<RenderedSection> = Vec::new();
        for &section in &self.config.sections {
            let mut section_vars = vars.clone();
            match section {
                Section::FileStructure => {
                    let tree = self
                        .repo
                        .folder_structure(self.config.directories_only_in_file_structure)?;
                    section_vars.insert("folder_structure".to_string(), tree);
                }
                Section::License => {
                    let Some(license) = self.repo.license() else {
                        // No license file means no license section, not an
                        // invented one and not a failed run.
                        info!("no license detected, skipping license section");
                        continue;
                    };
                    section_vars.insert("license_kind".to_string(), license.kind);
                    section_vars.insert("license_link".to_string(), license.link);
                }
                _ => {}
            }
            rendered.push(writer.generate(section, &section_vars).await?);
        }

        Ok(assemble(&rendered, &self.config.sections))
    }
}

impl std::fmt::Debug for ReadmeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadmeGenerator")
            .field("repo_url", &self.repo.repo_url())
            .field("model", &self.config.model)
            .field("sections", &self.config.sections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::repository::License;

    /// In-memory repository for orchestrator tests.
    struct FakeRepo {
        url: String,
        files: Vec<(String, String)>,
        license: Option<License>,
        fail_listing: bool,
    }

    impl FakeRepo {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                url: "https://example.com/owner/proj".to_string(),
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
                license: Some(License {
                    kind: "MIT".to_string(),
                    link: "LICENSE".to_string(),
                }),
                fail_listing: false,
            }
        }
    }

    impl RepositorySource for FakeRepo {
        fn repo_url(&self) -> &str {
            &self.url
        }

        fn list_files(&self) -> Result<Vec<String>> {
            if self.fail_listing {
                return Err(ReadmeError::RepositoryUnreadable {
                    path: "/fake".to_string(),
                    message: "permission denied".to_string(),
                });
            }
            Ok(self.files.iter().map(|(p, _)| p.clone()).collect())
        }

        fn read_file(&self, path: &str) -> Option<String> {
            self.files
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, c)| c.clone())
        }

        fn folder_structure(&self, _directories_only: bool) -> Result<String> {
            Ok(self
                .files
                .iter()
                .map(|(p, _)| p.as_str())
                .collect::<Vec<_>>()
                .join("\n"))
        }

        fn license(&self) -> Option<License> {
            self.license.clone()
        }

        fn readme(&self) -> Option<String> {
            None
        }
    }

    fn generator(repo: FakeRepo, mock: Arc<MockBackend>) -> ReadmeGenerator {
        let ctx = ExecCtx::builder("http://unused").backend(mock).build();
        ReadmeGenerator::new(
            Arc::new(repo),
            TemplateSet::builtin(),
            ctx,
            GeneratorConfig::default().with_model("test"),
        )
    }

    #[tokio::test]
    async fn test_full_document_in_contract_order() {
        let repo = FakeRepo::new(&[("a.py", "print(1)"), ("b.py", "print(2)")]);
        let mock = Arc::new(MockBackend::fixed("generated"));
        let readme = generator(repo, mock.clone()).generate_readme().await.unwrap();

        // Three generated sections and two direct fills, in declared order.
        let expected = "generated\n\n\
                        # File Structure\n\n```\na.py\nb.py\n```\n\n\
                        generated\n\n\
                        generated\n\n\
                        # License\n\n[MIT](LICENSE)";
        assert_eq!(readme, expected);
        // 2 file summaries + 3 generated sections.
        assert_eq!(mock.call_count(), 5);
    }

    #[tokio::test]
    async fn test_section_prompts_see_aggregates() {
        let repo = FakeRepo::new(&[("a.py", "print(1)")]);
        let mock = Arc::new(MockBackend::fixed("Summary of a"));
        generator(repo, mock.clone()).generate_readme().await.unwrap();

        let prompts = mock.prompts();
        // The last three prompts are the generated sections; each sees the
        // aggregates it declares.
        let intro = &prompts[1];
        assert!(intro.contains("Project file structure:\n- a.py"));
        assert!(intro.contains("- File: a.py\n- Contents: Summary of a"));
        let install = &prompts[2];
        assert!(install.contains("https://example.com/owner/proj"));
    }

    #[tokio::test]
    async fn test_unreadable_repo_fails_before_any_call() {
        let mut repo = FakeRepo::new(&[("a.py", "x")]);
        repo.fail_listing = true;
        let mock = Arc::new(MockBackend::fixed("unused"));
        let err = generator(repo, mock.clone()).generate_readme().await.unwrap_err();

        assert!(matches!(err, ReadmeError::RepositoryUnreadable { .. }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_license_skips_section() {
        let mut repo = FakeRepo::new(&[("a.py", "x")]);
        repo.license = None;
        let mock = Arc::new(MockBackend::fixed("gen"));
        let readme = generator(repo, mock).generate_readme().await.unwrap();

        assert!(!readme.contains("# License"));
        assert!(!readme.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn test_failed_summary_still_produces_full_document() {
        let repo = FakeRepo::new(&[("a.py", "fine"), ("b.py", "poison")]);
        let mock = Arc::new(MockBackend::fixed("gen").failing_on("poison"));
        let readme = generator(repo, mock.clone()).generate_readme().await.unwrap();

        assert!(readme.contains("# License"));
        // b.py is absent from the summaries aggregate but still listed in
        // the structure aggregate. Prompts 0 and 1 are the two summary
        // attempts (the failed one is recorded too); the introduction
        // prompt follows at index 2.
        let intro = &mock.prompts()[2];
        assert!(intro.contains("- b.py"));
        assert!(!intro.contains("- File: b.py"));
    }

    #[tokio::test]
    async fn test_oversized_file_not_summarized() {
        let big = "x".repeat(100);
        let repo = FakeRepo::new(&[("big.py", &big), ("small.py", "ok")]);
        let mock = Arc::new(MockBackend::fixed("gen"));
        let ctx = ExecCtx::builder("http://unused").backend(mock.clone()).build();
        let generator = ReadmeGenerator::new(
            Arc::new(repo),
            TemplateSet::builtin(),
            ctx,
            GeneratorConfig::default()
                .with_model("test")
                .with_max_file_bytes(50),
        );

        generator.generate_readme().await.unwrap();
        // 1 summary (small.py) + 3 sections.
        assert_eq!(mock.call_count(), 4);
        assert!(!mock.prompts()[0].contains(&big));
    }

    #[tokio::test]
    async fn test_section_subset_and_order_respected() {
        let repo = FakeRepo::new(&[("a.py", "x")]);
        let mock = Arc::new(MockBackend::fixed("intro"));
        let ctx = ExecCtx::builder("http://unused").backend(mock.clone()).build();
        let generator = ReadmeGenerator::new(
            Arc::new(repo),
            TemplateSet::builtin(),
            ctx,
            GeneratorConfig::default()
                .with_model("test")
                .with_sections(vec![Section::License, Section::Introduction]),
        );

        let readme = generator.generate_readme().await.unwrap();
        assert_eq!(readme, "# License\n\n[MIT](LICENSE)\n\nintro");
        // 1 summary + 1 generated section.
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_with_local_checkout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/app.py"), "print('hi')\n").unwrap();
        std::fs::write(dir.path().join("LICENSE"), "MIT License\n").unwrap();
        let repo = Arc::new(crate::LocalRepository::new(
            "https://example.com/owner/proj",
            dir.path(),
        ));

        let mock = Arc::new(MockBackend::fixed("gen"));
        let ctx = ExecCtx::builder("http://unused").backend(mock).build();
        let generator = ReadmeGenerator::new(
            repo,
            TemplateSet::builtin(),
            ctx,
            GeneratorConfig::default().with_model("test"),
        );

        let readme = generator.generate_readme().await.unwrap();
        assert!(readme.contains("# File Structure\n\n```\nLICENSE\nsrc/\n    app.py\n```"));
        assert!(readme.ends_with("# License\n\n[MIT](LICENSE)"));
    }

    #[tokio::test]
    async fn test_run_end_event_reports_failure() {
        use crate::events::FnEventHandler;
        use std::sync::Mutex;

        let outcomes: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let outcomes_clone = outcomes.clone();
        let handler = Arc::new(FnEventHandler(move |event: Event| {
            if let Event::RunEnd { ok } = event {
                outcomes_clone.lock().unwrap().push(ok);
            }
        }));

        let mut repo = FakeRepo::new(&[("a.py", "x")]);
        repo.fail_listing = true;
        let mock: Arc<MockBackend> = Arc::new(MockBackend::fixed("unused"));
        let ctx = ExecCtx::builder("http://unused")
            .backend(mock)
            .event_handler(handler)
            .build();
        let generator = ReadmeGenerator::new(
            Arc::new(repo),
            TemplateSet::builtin(),
            ctx,
            GeneratorConfig::default(),
        );

        assert!(generator.generate_readme().await.is_err());
        assert_eq!(*outcomes.lock().unwrap(), vec![false]);
    }
}
