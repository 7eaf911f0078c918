//! Repository access capability.
//!
//! The pipeline consumes a repository through the [`RepositorySource`] trait:
//! an ordered file listing, per-file text content, a folder-structure
//! rendering, and license/README detection. [`LocalRepository`] is the one
//! concrete adapter, reading an existing checkout from disk. Tests substitute
//! their own implementations.

pub mod local;

pub use local::LocalRepository;

use crate::error::Result;

/// A detected repository license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// License kind (e.g. `"MIT"`, `"Apache-2.0"`).
    pub kind: String,
    /// Link target for the license section (typically the license file).
    pub link: String,
}

/// Capability interface over a repository checkout.
///
/// All methods are cheap local I/O; the scan is re-done per call so a single
/// `generate_readme` run sees one consistent enumeration (the orchestrator
/// lists once and passes the listing down).
pub trait RepositorySource: Send + Sync {
    /// The repository's remote URL (used in prompts, e.g. for install
    /// instructions).
    fn repo_url(&self) -> &str;

    /// Relative paths of all tracked files, in a stable order.
    ///
    /// Fails if the repository root cannot be read at all; that failure is
    /// fatal to a run.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Text content of one file, or `None` if the file is binary, not valid
    /// UTF-8, or unreadable. Absence is not an error: such files are simply
    /// excluded from summarization.
    fn read_file(&self, path: &str) -> Option<String>;

    /// A tree rendering of the folder structure, optionally directories only.
    fn folder_structure(&self, directories_only: bool) -> Result<String>;

    /// The detected license, if any.
    fn license(&self) -> Option<License>;

    /// Contents of an existing README, if the repository already has one.
    /// Callers use this to warn before overwriting.
    fn readme(&self) -> Option<String>;
}
