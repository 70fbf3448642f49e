//! Effective settings for a command run.
//!
//! The project root comes from `--root` or the nearest marked ancestor of
//! the working directory. Configuration is read from `--config` or
//! `<root>/quire.toml`, then command-line flags and their environment
//! variables are layered on top.

use std::path::{Path, PathBuf};

use quire_core::config::RemoteConfig;
use quire_core::{QuireConfig, Result, RootResolver};

use crate::cli::GlobalArgs;

/// Fallback environment variable for the API token.
pub const FALLBACK_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Project root plus resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project root.
    pub root: PathBuf,
    /// Configuration with overrides applied.
    pub config: QuireConfig,
}

impl Settings {
    /// Resolve settings relative to the current directory.
    pub fn resolve(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let fallback_token = std::env::var(FALLBACK_TOKEN_VAR).ok();
        Self::resolve_from(global, &cwd, fallback_token)
    }

    /// Resolve settings from an explicit working directory and fallback
    /// token.
    pub fn resolve_from(
        global: &GlobalArgs,
        cwd: &Path,
        fallback_token: Option<String>,
    ) -> Result<Self> {
        let root = RootResolver::new().resolve(global.root.as_deref(), cwd);
        let mut config = match &global.config {
            Some(path) => QuireConfig::load(Some(path))?,
            None => QuireConfig::load_from_root(&root)?,
        };
        apply_overrides(&mut config, global, fallback_token);
        Ok(Self { root, config })
    }

    /// The docs directory.
    pub fn docs_root(&self) -> PathBuf {
        self.config.docs_root(&self.root)
    }

    /// The index file.
    pub fn index_path(&self) -> PathBuf {
        self.config.index_path(&self.root)
    }
}

/// Layer flags (and their environment variables) over file configuration.
pub fn apply_overrides(config: &mut QuireConfig, global: &GlobalArgs, fallback_token: Option<String>) {
    config.debug |= global.debug;

    if let Some(repo) = &global.remote {
        match &mut config.remote {
            Some(remote) => remote.repo = repo.clone(),
            None => config.remote = Some(RemoteConfig::new(repo.clone())),
        }
    }

    config.commit.enabled |= global.auto_commit;
    if let Some(token) = global
        .token
        .clone()
        .or(fallback_token)
        .filter(|t| !t.trim().is_empty())
    {
        config.commit.token = Some(token);
    }
    if !global.reviewers.is_empty() {
        config.commit.reviewers = clean_list(&global.reviewers);
    }
    if !global.labels.is_empty() {
        config.commit.labels = clean_list(&global.labels);
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
