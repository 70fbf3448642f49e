//! Async file discovery.
//!
//! The walker enumerates every file with a given suffix under a root,
//! pruning directories by exact name (version control and dependency
//! metadata by default). Walk order is whatever the filesystem yields;
//! callers that need determinism sort afterwards.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_walkdir::{Filtering, WalkDir};
use futures::StreamExt;

use crate::{Error, Result};

/// Directory names never descended into by default.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// Options controlling [`find_all_files`].
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Required filename suffix (e.g. `.md`).
    pub suffix: String,
    /// Directory names to prune, matched exactly.
    pub excluded_dirs: Vec<String>,
    /// File names to skip, matched case-insensitively.
    pub skipped_files: Vec<String>,
}

impl FindOptions {
    /// Markdown files, pruning `.git` and `node_modules`.
    pub fn markdown() -> Self {
        Self {
            suffix: ".md".to_string(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            skipped_files: Vec::new(),
        }
    }

    /// Also prune directories with this exact name.
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.excluded_dirs.push(name.into());
        self
    }

    /// Skip files with this name.
    pub fn skip_file(mut self, name: impl Into<String>) -> Self {
        self.skipped_files.push(name.into());
        self
    }

    fn accepts_file(&self, name: &str) -> bool {
        name.ends_with(&self.suffix)
            && !self
                .skipped_files
                .iter()
                .any(|skipped| skipped.eq_ignore_ascii_case(name))
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Find every file under `root` matching `options`.
///
/// # Errors
///
/// Fails with an I/O error if `root` does not exist or is not a directory.
/// Errors on individual entries below the root are logged and skipped.
pub async fn find_all_files(root: &Path, options: &FindOptions) -> Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(root)
        .await
        .map_err(|e| Error::io_with_path(e, root))?;
    if !metadata.is_dir() {
        return Err(Error::io_with_path(
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            root,
        ));
    }

    let excluded: Arc<HashSet<String>> = Arc::new(options.excluded_dirs.iter().cloned().collect());
    let mut walker = WalkDir::new(root).filter(move |entry| {
        let excluded = Arc::clone(&excluded);
        async move {
            let name = entry.file_name();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir && excluded.contains(name.to_string_lossy().as_ref()) {
                Filtering::IgnoreDir
            } else {
                Filtering::Continue
            }
        }
    });

    let mut files = Vec::new();
    while let Some(entry) = walker.next().await {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Walk error: {e}");
                continue;
            }
        };

        let is_file = match entry.file_type().await {
            Ok(t) => t.is_file(),
            Err(e) => {
                log::warn!("Cannot stat {:?}: {e}", entry.path());
                continue;
            }
        };
        if !is_file {
            continue;
        }

        let name = entry.file_name();
        if options.accepts_file(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }

    log::debug!("Found {} files under {:?}", files.len(), root);
    Ok(files)
}

/// Write `content` to `path` through a sibling temporary file and a rename,
/// creating parent directories as needed.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| Error::operation(format!("Not a file path: {}", path.display())))?;
    tmp_name.push(".quire-tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, content).map_err(|e| Error::io_with_path(e, &tmp))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::io_with_path(e, path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    fn sorted_relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        let mut rel: Vec<String> = files
            .iter()
            .map(|f| crate::util::ids::to_slash(f.strip_prefix(root).unwrap()))
            .collect();
        rel.sort();
        rel
    }

    #[tokio::test]
    async fn test_finds_markdown_recursively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.md");
        touch(dir.path(), "nested/deep/b.md");
        touch(dir.path(), "nested/c.txt");

        let files = find_all_files(dir.path(), &FindOptions::markdown())
            .await
            .unwrap();
        assert_eq!(sorted_relative(dir.path(), files), vec!["a.md", "nested/deep/b.md"]);
    }

    #[tokio::test]
    async fn test_prunes_excluded_dirs_by_exact_name() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "keep.md");
        touch(dir.path(), ".git/HEAD.md");
        touch(dir.path(), "node_modules/pkg/readme.md");
        touch(dir.path(), "my_node_modules/kept.md");

        let files = find_all_files(dir.path(), &FindOptions::markdown())
            .await
            .unwrap();
        assert_eq!(
            sorted_relative(dir.path(), files),
            vec!["keep.md", "my_node_modules/kept.md"]
        );
    }

    #[tokio::test]
    async fn test_extra_exclusions_and_skipped_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "guide.md");
        touch(dir.path(), "scripts/notes.md");

        let options = FindOptions::markdown()
            .exclude_dir("scripts")
            .skip_file("readme.md");
        let files = find_all_files(dir.path(), &options).await.unwrap();
        assert_eq!(sorted_relative(dir.path(), files), vec!["guide.md"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = find_all_files(&dir.path().join("nope"), &FindOptions::markdown())
            .await
            .unwrap_err();
        assert!(err.is_io());
    }

    #[tokio::test]
    async fn test_file_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.md");
        let err = find_all_files(&dir.path().join("file.md"), &FindOptions::markdown())
            .await
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.json");
        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        assert!(!dir.path().join("a/b/out.json.quire-tmp").exists());
    }
}
