//! Configuration for generation calls and for the pipeline as a whole.

use std::time::Duration;

use crate::section::Section;

/// Options forwarded to the generation backend with every request.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Temperature (0.0 = deterministic, 1.0 = creative). README prose wants
    /// repeatable output, so the default is 0.0 like the original model setup.
    pub temperature: f64,

    /// Maximum tokens to generate per call.
    pub max_tokens: u32,

    /// Custom provider options merged into the request body.
    pub options: Option<serde_json::Value>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 2048,
            options: None,
        }
    }
}

impl GenOptions {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// Configuration for a [`ReadmeGenerator`](crate::generator::ReadmeGenerator).
///
/// Section inclusion and order are configuration, not separate generator
/// types: the default is the full document in contract order, and callers
/// subset or reorder via `sections`.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier (e.g. `"llama3.2:3b"`, `"gpt-4o-mini"`).
    pub model: String,

    /// Generation options applied to every call.
    pub gen: GenOptions,

    /// Sections to produce, in output order.
    pub sections: Vec<Section>,

    /// Render only directories in the file-structure section's tree.
    pub directories_only_in_file_structure: bool,

    /// Files larger than this many bytes are skipped during summarization
    /// (they still appear in the file listing).
    pub max_file_bytes: u64,

    /// How many file summaries may be in flight at once.
    pub summary_concurrency: usize,

    /// Deadline for one `generate_readme` run, if any.
    pub run_deadline: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2:3b".to_string(),
            gen: GenOptions::default(),
            sections: Section::DEFAULT_ORDER.to_vec(),
            directories_only_in_file_structure: false,
            max_file_bytes: 64 * 1024,
            summary_concurrency: 4,
            run_deadline: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_gen_options(mut self, gen: GenOptions) -> Self {
        self.gen = gen;
        self
    }

    /// Set the sections to produce, in output order.
    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_directories_only(mut self, enabled: bool) -> Self {
        self.directories_only_in_file_structure = enabled;
        self
    }

    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    pub fn with_summary_concurrency(mut self, workers: usize) -> Self {
        self.summary_concurrency = workers.max(1);
        self
    }

    pub fn with_run_deadline(mut self, deadline: Duration) -> Self {
        self.run_deadline = Some(deadline);
        self
    }
}
