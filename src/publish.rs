//! Writing the generated document to disk.

use std::path::Path;

use tracing::info;

use crate::error::{ReadmeError, Result};

/// Write `text` to `path`, creating parent directories as needed.
///
/// A trailing newline is appended if the document lacks one. The write
/// replaces any existing file; callers who care about overwriting should
/// check [`ReadmeGenerator::existing_readme`](crate::ReadmeGenerator::existing_readme)
/// first.
pub fn write_readme(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ReadmeError::Other(format!("creating {}: {}", parent.display(), e)))?;
        }
    }
    let mut contents = text.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    std::fs::write(path, contents)
        .map_err(|e| ReadmeError::Other(format!("writing {}: {}", path.display(), e)))?;
    info!(path = %path.display(), bytes = text.len(), "wrote README");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_appends_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        write_readme(&path, "# Title").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title\n");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/README.md");
        write_readme(&path, "# Title\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title\n");
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "old\n").unwrap();
        write_readme(&path, "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }
}
