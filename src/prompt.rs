//! Prompt rendering primitives.
//!
//! Placeholder substitution for prompt templates, plus the textual renderings
//! of the repository aggregates (file list, per-file summaries) that get
//! spliced into prompts. The aggregate renderings are an external contract:
//! they become literal substrings of the prompts sent to the generation
//! backend, so golden-output tests depend on them byte for byte.

use std::collections::HashMap;

use crate::summarize::FileSummary;

/// Sentinel that should never appear in real templates.
const ESCAPE_SENTINEL: &str = "\x00LBRACE\x00";
/// Sentinel for escaped closing brace.
const ESCAPE_SENTINEL_CLOSE: &str = "\x00RBRACE\x00";

/// Substitute `{key}` placeholders in a template with values from `vars`.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
/// Unknown placeholders are left in place; required-placeholder validation
/// happens in [`Template::render`](crate::template::Template::render) before
/// this runs.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use readmaker::prompt::substitute;
///
/// let mut vars = HashMap::new();
/// vars.insert("name".to_string(), "Alice".to_string());
/// let result = substitute("Hello {name}, literal: {{x}}", &vars);
/// assert_eq!(result, "Hello Alice, literal: {x}");
/// ```
pub fn substitute(template: &str, vars: &HashMap<String, String>) -> String {
    // Pass 1: protect escaped braces
    let mut rendered = template.replace("{{", ESCAPE_SENTINEL);
    rendered = rendered.replace("}}", ESCAPE_SENTINEL_CLOSE);

    // Pass 2: substitute placeholders
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }

    // Pass 3: restore escaped braces
    rendered = rendered.replace(ESCAPE_SENTINEL, "{");
    rendered = rendered.replace(ESCAPE_SENTINEL_CLOSE, "}");
    rendered
}

/// Render the repository file listing as prompt text.
///
/// One bullet per file, in listing order:
///
/// ```text
/// Project file structure:
/// - src/lib.rs
/// - Cargo.toml
/// ```
pub fn files_structure_text(files: &[String]) -> String {
    let mut text = String::from("Project file structure:\n");
    text.push_str(
        &files
            .iter()
            .map(|file| format!("- {}", file))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    text
}

/// Render the per-file summaries as prompt text.
///
/// Entries appear in summary order (which the summarization stage keeps
/// aligned with the file listing), joined by blank lines:
///
/// ```text
/// Projects files contents summaries:
/// - File: src/lib.rs
/// - Contents: Library entry point.
/// ```
pub fn files_summaries_text(summaries: &[FileSummary]) -> String {
    let mut text = String::from("Projects files contents summaries:\n");
    text.push_str(
        &summaries
            .iter()
            .map(|s| format!("- File: {}\n- Contents: {}", s.path, s.summary))
            .collect::<Vec<_>>()
            .join("\n\n"),
    );
    text
}
