//! Deterministic document assembly.
//!
//! Takes the rendered sections and produces the final README text: each
//! section is fence-stripped, then the blocks are joined with a blank line in
//! the configured section order. No model call happens here; the same inputs
//! always produce the same document byte-for-byte.

use crate::section::{RenderedSection, Section};

/// Remove a wrapping markdown code fence from generated text.
///
/// Models frequently wrap whole answers in a triple-backtick fence (often
/// with a language tag on the opening line). If `text` starts with one, the
/// first and last lines are dropped; otherwise the text is returned
/// unchanged.
///
/// If stripping would leave text that still opens with a fence line, the
/// input is a fenced block in its own right and is returned unchanged.
/// The output therefore never starts with a fence unless it equals the
/// input, which makes a second application a no-op.
pub fn strip_fence(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    let mut lines: Vec<&str> = text.lines().collect();
    lines.remove(0);
    if let Some(last) = lines.last() {
        if last.trim_start().starts_with("```") {
            lines.pop();
        }
    }
    let stripped = lines.join("\n");
    if stripped.starts_with("```") {
        return text.to_string();
    }
    stripped
}

/// Join rendered sections into the final document.
///
/// Sections appear in `order`; anything not present in `sections` (e.g. a
/// skipped license section) is left out without a gap. Completion order of
/// the inputs is irrelevant.
pub fn assemble(sections: &[RenderedSection], order: &[Section]) -> String {
    let blocks: Vec<String> = order
        .iter()
        .filter_map(|wanted| {
            sections
                .iter()
                .find(|r| r.section == *wanted)
                .map(|r| strip_fence(&r.text))
        })
        .collect();
    blocks.join("\n\n")
}
