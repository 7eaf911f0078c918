//! # ReadMaker
//!
//! Generates a complete README.md for a code repository using a local or
//! remote LLM.
//!
//! The pipeline scans a repository checkout, summarizes each readable file
//! with one model call per file, generates the prose sections from templated
//! prompts fed with those summaries, and deterministically assembles the
//! final document. Two sections (file structure and license) are filled
//! directly from repository data with no model call.
//!
//! ## Core Concepts
//!
//! - **[`RepositorySource`]** — capability trait over a repository: file
//!   listing, per-file text, folder tree, license/README detection.
//!   [`LocalRepository`] reads an existing checkout from disk.
//! - **[`ExecCtx`]** — shared execution context (HTTP client, backend,
//!   endpoint, retries, timeout, cancellation, events).
//! - **[`TemplateSet`]** — the prompt templates, either the built-in set or
//!   loaded from a directory of `.txt` files.
//! - **[`ReadmeGenerator`]** — the orchestrator: scan, summarize, generate
//!   sections, assemble.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use readmaker::{ExecCtx, GeneratorConfig, LocalRepository, ReadmeGenerator, TemplateSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Arc::new(LocalRepository::new(
//!         "https://github.com/owner/project",
//!         "./checkout",
//!     ));
//!     let ctx = ExecCtx::builder("http://localhost:11434").build();
//!     let generator = ReadmeGenerator::new(
//!         repo,
//!         TemplateSet::builtin(),
//!         ctx,
//!         GeneratorConfig::default().with_model("llama3.2:3b"),
//!     );
//!
//!     let readme = generator.generate_readme().await?;
//!     readmaker::write_readme("README.md", &readme)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Degraded output
//!
//! A file whose summary call fails is excluded from the summary aggregate and
//! the run continues; a partial README beats no README. Repository-level
//! failures, section failures, and template misuse are fatal. Subscribe to
//! [`events::EventHandler`] to observe exclusions as they happen.

pub mod assemble;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod generator;
pub mod prompt;
pub mod publish;
pub mod repository;
pub mod section;
pub mod summarize;
pub mod template;

pub use assemble::{assemble, strip_fence};
pub use backend::{BackoffConfig, GenerationBackend, MockBackend, OllamaBackend};
#[cfg(feature = "openai")]
pub use backend::OpenAiBackend;
pub use config::{GenOptions, GeneratorConfig};
pub use error::{ReadmeError, Result};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use generator::ReadmeGenerator;
pub use publish::write_readme;
pub use repository::{License, LocalRepository, RepositorySource};
pub use section::{RenderedSection, Section, SectionWriter};
pub use summarize::FileSummary;
pub use template::{Template, TemplateSet};
