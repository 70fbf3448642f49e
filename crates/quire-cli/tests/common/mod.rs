//! Common test utilities for Quire integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use quire_cli::cli::GlobalArgs;
use quire_cli::Settings;
use quire_core::config::RemoteConfig;
use quire_core::RepoRef;
use tempfile::TempDir;

/// A temporary project with a `docs/` directory.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Creates an empty project.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("docs")).expect("docs dir");
        Self { dir }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file relative to the project root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Writes a file relative to the project root.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(path, content).expect("write file");
        self
    }

    /// Reads a file relative to the project root.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Settings rooted at this project with default configuration.
    pub fn settings(&self) -> Settings {
        let global = GlobalArgs {
            root: Some(self.root().to_path_buf()),
            ..Default::default()
        };
        Settings::resolve_from(&global, self.root(), None).expect("settings")
    }

    /// Settings with a remote repository served from `base_url`.
    pub fn settings_with_remote(&self, base_url: &str) -> Settings {
        let mut settings = self.settings();
        settings.config.remote = Some(RemoteConfig {
            repo: remote_repo(),
            api_base: base_url.to_string(),
            raw_base: base_url.to_string(),
            timeout_secs: 5,
        });
        settings
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// The remote repository used by fetch tests.
pub fn remote_repo() -> RepoRef {
    RepoRef::new("acme", "standards", "main")
}

/// A document with a header block.
pub fn doc(id: &str, title: &str, extra: &str, body: &str) -> String {
    format!("---\nid: {id}\ntitle: {title}\n{extra}---\n{body}")
}
