//! Repository adapter over a local checkout.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use super::{License, RepositorySource};
use crate::error::{ReadmeError, Result};

/// Candidate license file names, checked case-insensitively at the root.
const LICENSE_FILES: [&str; 5] = [
    "LICENSE",
    "LICENSE.md",
    "LICENSE.txt",
    "COPYING",
    "LICENCE",
];

/// Candidate README file names, checked case-insensitively at the root.
const README_FILES: [&str; 3] = ["README.md", "README.rst", "README"];

/// A repository checkout on the local filesystem.
///
/// Walks the tree with gitignore semantics: hidden files, `.git/`, and
/// anything matched by the repository's ignore files are excluded. Binary
/// and non-UTF-8 files stay in the listing but yield no content.
pub struct LocalRepository {
    repo_url: String,
    root: PathBuf,
}

impl LocalRepository {
    /// Create an adapter for the checkout at `root`.
    ///
    /// `repo_url` is the remote URL the checkout came from; it is only used
    /// as prompt material, never dereferenced.
    pub fn new(repo_url: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            repo_url: repo_url.into(),
            root: root.into(),
        }
    }

    /// The checkout root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(ReadmeError::RepositoryUnreadable {
                path: self.root.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkBuilder::new(&self.root).build() {
            let entry = entry.map_err(|e| ReadmeError::RepositoryUnreadable {
                path: self.root.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path());
            // Forward slashes regardless of platform: paths are prompt text.
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(rel);
        }
        // Walk order varies between platforms; the listing is prompt material
        // and must be stable.
        files.sort();
        Ok(files)
    }

    /// Find a root-level file matching one of `names`, case-insensitively.
    fn find_root_file(&self, names: &[&str]) -> Option<String> {
        let entries = std::fs::read_dir(&self.root).ok()?;
        let mut found: Vec<String> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                found.push(name);
            }
        }
        found.sort();
        found.into_iter().next()
    }

    /// Classify a license by its text. Best effort; unknown texts are kept
    /// with a generic kind rather than dropped.
    fn classify_license(text: &str) -> String {
        let upper = text.to_uppercase();
        if upper.contains("MIT LICENSE") || upper.contains("MIT LICENCE") {
            "MIT".to_string()
        } else if upper.contains("APACHE LICENSE") {
            "Apache-2.0".to_string()
        } else if upper.contains("GNU GENERAL PUBLIC LICENSE") {
            if upper.contains("VERSION 3") {
                "GPL-3.0".to_string()
            } else {
                "GPL-2.0".to_string()
            }
        } else if upper.contains("GNU LESSER GENERAL PUBLIC LICENSE") {
            "LGPL".to_string()
        } else if upper.contains("MOZILLA PUBLIC LICENSE") {
            "MPL-2.0".to_string()
        } else if upper.contains("BSD") {
            "BSD".to_string()
        } else {
            "License".to_string()
        }
    }
}

impl RepositorySource for LocalRepository {
    fn repo_url(&self) -> &str {
        &self.repo_url
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.walk()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        let full = self.root.join(path);
        let bytes = match std::fs::read(&full) {
            Ok(b) => b,
            Err(e) => {
                debug!(path, error = %e, "skipping unreadable file");
                return None;
            }
        };
        // NUL byte is the cheapest reliable binary tell.
        if memchr::memchr(0, &bytes).is_some() {
            debug!(path, "skipping binary file");
            return None;
        }
        match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(_) => {
                debug!(path, "skipping non-UTF-8 file");
                None
            }
        }
    }

    fn folder_structure(&self, directories_only: bool) -> Result<String> {
        let files = self.walk()?;
        Ok(render_tree(&files, directories_only))
    }

    fn license(&self) -> Option<License> {
        let name = self.find_root_file(&LICENSE_FILES)?;
        let text = std::fs::read_to_string(self.root.join(&name)).ok()?;
        Some(License {
            kind: Self::classify_license(&text),
            link: name,
        })
    }

    fn readme(&self) -> Option<String> {
        let name = self.find_root_file(&README_FILES)?;
        std::fs::read_to_string(self.root.join(name)).ok()
    }
}

/// Render a sorted list of relative paths as an indented tree.
///
/// ```text
/// src/
///     repository/
///         local.rs
///     lib.rs
/// Cargo.toml
/// ```
fn render_tree(files: &[String], directories_only: bool) -> String {
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Node {
        children: BTreeMap<String, Node>,
        is_file: bool,
    }

    let mut root = Node::default();
    for file in files {
        let mut node = &mut root;
        let parts: Vec<&str> = file.split('/').collect();
        for (i, part) in parts.iter().enumerate() {
            node = node.children.entry(part.to_string()).or_default();
            if i == parts.len() - 1 {
                node.is_file = true;
            }
        }
    }

    fn render(node: &Node, depth: usize, directories_only: bool, out: &mut String) {
        for (name, child) in &node.children {
            if directories_only && child.is_file {
                continue;
            }
            for _ in 0..depth {
                out.push_str("    ");
            }
            out.push_str(name);
            if !child.is_file {
                out.push('/');
            }
            out.push('\n');
            render(child, depth + 1, directories_only, out);
        }
    }

    let mut out = String::new();
    render(&root, 0, directories_only, &mut out);
    // No trailing newline; the section wraps this in a code fence.
    out.truncate(out.trim_end().len());
    out
}
