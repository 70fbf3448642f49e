//! Project root resolution.
//!
//! Quire commands operate on a project root containing the docs directory.
//! `RootResolver` picks that root from an explicit path, or by walking up
//! from a starting directory until a marker is found, or falls back to the
//! starting directory itself.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use quire_core::util::resolver::RootResolver;
//!
//! let resolver = RootResolver::new().with_markers(&["quire.toml", ".git"]);
//! let root = resolver.resolve(None, Path::new("/repo/docs/guides"));
//! println!("Project root: {}", root.display());
//! ```

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_CONFIG_FILE;

/// Locates the project root for a command invocation.
#[derive(Debug, Clone)]
pub struct RootResolver {
    /// Files or directories whose presence marks a project root.
    markers: Vec<String>,
}

impl RootResolver {
    /// Resolver with the default markers (`quire.toml`, `.git`).
    pub fn new() -> Self {
        Self {
            markers: vec![DEFAULT_CONFIG_FILE.to_string(), ".git".to_string()],
        }
    }

    /// Replace the marker list.
    pub fn with_markers(mut self, markers: &[&str]) -> Self {
        self.markers = markers.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Resolve the project root.
    ///
    /// Checks in order:
    /// 1. The explicit path, if given
    /// 2. The nearest ancestor of `start` (inclusive) containing a marker
    /// 3. `start` itself
    pub fn resolve(&self, explicit: Option<&Path>, start: &Path) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        self.find_marked_ancestor(start)
            .unwrap_or_else(|| start.to_path_buf())
    }

    /// Nearest ancestor of `start` (inclusive) that contains any marker.
    pub fn find_marked_ancestor(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| self.markers.iter().any(|m| dir.join(m).exists()))
            .map(Path::to_path_buf)
    }

    /// The configured markers.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for RootResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_markers() {
        let resolver = RootResolver::new();
        assert_eq!(resolver.markers(), &["quire.toml", ".git"]);
    }

    #[test]
    fn test_explicit_path_wins() {
        let resolver = RootResolver::new();
        let root = resolver.resolve(Some(Path::new("/explicit")), Path::new("/elsewhere"));
        assert_eq!(root, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_walks_up_to_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("quire.toml"), "").unwrap();
        let nested = dir.path().join("docs/guides");
        std::fs::create_dir_all(&nested).unwrap();

        let root = RootResolver::new().resolve(None, &nested);
        assert_eq!(root, dir.path());
    }

    #[test]
    fn test_custom_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        let nested = dir.path().join("docs");

        let resolver = RootResolver::new().with_markers(&["docs"]);
        assert_eq!(resolver.find_marked_ancestor(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_falls_back_to_start() {
        let dir = TempDir::new().unwrap();
        let resolver = RootResolver::new().with_markers(&["definitely-not-present.marker"]);
        assert_eq!(resolver.resolve(None, dir.path()), dir.path());
    }
}
