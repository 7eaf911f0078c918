//! Prompt templates and the named template set.
//!
//! A [`Template`] knows which `{placeholder}` names its text requires; the
//! names are scanned once at construction. Rendering with a missing variable
//! fails with [`ReadmeError::MissingVariable`] before any backend call is
//! attempted.
//!
//! A [`TemplateSet`] holds one template per generation step. The built-in set
//! covers every step the pipeline needs; a set can also be loaded from a
//! directory (file-per-template, name taken from the file stem), in which
//! case every required template must be present at load time.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ReadmeError, Result};
use crate::prompt::substitute;

/// Template names the pipeline cannot run without.
pub const REQUIRED_TEMPLATES: [&str; 4] = [
    "file_summary",
    "introduction",
    "installation",
    "repository_overview",
];

const DEFAULT_FILE_SUMMARY: &str = "\
You are documenting a software repository. Summarize the following file in \
two or three plain sentences: what it contains and what role it plays. Do \
not quote the code back.

File contents:
{file_contents}";

const DEFAULT_INTRODUCTION: &str = "\
You are writing the introduction section of a README.md for a software \
repository. Using the file structure and the per-file summaries below, write \
a short introduction in markdown starting with a level-1 title and a one \
paragraph description of what the project does. Do not wrap the output in a \
code block.

{files_structure}

{files_summaries}";

const DEFAULT_INSTALLATION: &str = "\
You are writing the Installation section of a README.md. The repository is \
hosted at {repository_url}. Using the per-file summaries below, write \
markdown instructions for cloning the repository and installing its \
dependencies, starting with the header '# Installation'. Do not wrap the \
output in a code block.

{files_summaries}";

const DEFAULT_REPOSITORY_OVERVIEW: &str = "\
You are writing the Repository Overview section of a README.md. Using the \
file structure and the per-file summaries below, describe in markdown what \
each major file or directory is for, starting with the header \
'# Repository Overview'. Do not wrap the output in a code block.

{files_structure}

{files_summaries}";

/// A named prompt template with a fixed set of required placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: String,
    placeholders: Vec<String>,
}

impl Template {
    /// Create a template, scanning its text for `{placeholder}` names.
    ///
    /// `{{`/`}}` escapes are not treated as placeholders.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let placeholders = scan_placeholders(&text);
        Self {
            name: name.into(),
            text,
            placeholders,
        }
    }

    /// Template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names this template requires, in order of first appearance.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Render the template with the given variables.
    ///
    /// Fails with [`ReadmeError::MissingVariable`] if any required
    /// placeholder is absent from `vars`. Extra variables are ignored.
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String> {
        for placeholder in &self.placeholders {
            if !vars.contains_key(placeholder) {
                return Err(ReadmeError::MissingVariable {
                    template: self.name.clone(),
                    variable: placeholder.clone(),
                });
            }
        }
        Ok(substitute(&self.text, vars))
    }
}

/// Scan template text for `{name}` placeholders, skipping `{{` escapes.
fn scan_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'{' {
                i += 2;
                continue;
            }
            if let Some(end) = text[i + 1..].find('}') {
                let candidate = &text[i + 1..i + 1 + end];
                let valid = !candidate.is_empty()
                    && candidate
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_');
                if valid {
                    if !names.iter().any(|n| n == candidate) {
                        names.push(candidate.to_string());
                    }
                    i += end + 2;
                    continue;
                }
            }
        }
        i += 1;
    }
    names
}

/// An immutable, named collection of prompt templates.
///
/// Construct with [`TemplateSet::builtin`] or [`TemplateSet::load_dir`]; both
/// guarantee that every template in [`REQUIRED_TEMPLATES`] is present, so a
/// missing template is a construction error and can never surface mid-run.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// The built-in default templates.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        for (name, text) in [
            ("file_summary", DEFAULT_FILE_SUMMARY),
            ("introduction", DEFAULT_INTRODUCTION),
            ("installation", DEFAULT_INSTALLATION),
            ("repository_overview", DEFAULT_REPOSITORY_OVERVIEW),
        ] {
            templates.insert(name.to_string(), Template::new(name, text));
        }
        Self { templates }
    }

    /// Load a template set from a directory, one file per template.
    ///
    /// The template name is the file name without its extension. Fails with
    /// [`ReadmeError::TemplateNotFound`] if any required template is missing,
    /// so a broken resource directory is caught before any run starts.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ReadmeError::InvalidConfig(format!(
                "cannot read template directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let mut templates = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ReadmeError::InvalidConfig(format!("cannot read template directory entry: {}", e))
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|e| {
                ReadmeError::InvalidConfig(format!(
                    "cannot read template file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            templates.insert(stem.to_string(), Template::new(stem, text));
        }

        for required in REQUIRED_TEMPLATES {
            if !templates.contains_key(required) {
                return Err(ReadmeError::TemplateNotFound(required.to_string()));
            }
        }

        Ok(Self { templates })
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| ReadmeError::TemplateNotFound(name.to_string()))
    }

    /// Replace or add a single template (builder style).
    ///
    /// Lets callers override one prompt without supplying a whole directory.
    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.insert(template.name().to_string(), template);
        self
    }

    /// Names of all loaded templates (unordered).
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }
}
