//! Configuration for Quire operations.
//!
//! Everything the toolkit used to read from process-wide environment
//! variables lives here instead and is passed in at construction time.
//! The file format is TOML:
//!
//! ```toml
//! docs_dir = "docs"
//! index_file = "docs-index.json"
//! debug = false
//!
//! [remote]
//! owner = "acme"
//! repo = "standards"
//! branch = "main"
//!
//! [commit]
//! enabled = true
//! reviewers = ["alice"]
//! labels = ["docs-cache"]
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default directory, relative to the project root, holding the documents.
pub const DEFAULT_DOCS_DIR: &str = "docs";

/// Default index filename, written inside the docs directory.
pub const DEFAULT_INDEX_FILE: &str = "docs-index.json";

/// Default config filename looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "quire.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuireConfig {
    /// Docs directory, relative to the project root.
    pub docs_dir: PathBuf,
    /// Index filename inside the docs directory.
    pub index_file: String,
    /// Emit debug diagnostics.
    pub debug: bool,
    /// Remote repository used to fetch documents that are missing locally.
    pub remote: Option<RemoteConfig>,
    /// Optional commit/pull-request automation for fetched documents.
    pub commit: CommitConfig,
    /// Link checking.
    pub links: LinkCheckConfig,
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            debug: false,
            remote: None,
            commit: CommitConfig::default(),
            links: LinkCheckConfig::default(),
        }
    }
}

impl QuireConfig {
    /// Load configuration from a TOML file.
    ///
    /// With `None`, returns defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
                Self::from_toml_str(&content)
                    .map_err(|e| Error::config(format!("{}: {e}", path.display())))
            }
            None => Ok(Self::default()),
        }
    }

    /// Load `quire.toml` from a project root if it exists, else defaults.
    pub fn load_from_root(root: &Path) -> Result<Self> {
        let candidate = root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(Some(&candidate))
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize to pretty TOML. The commit token is never written out.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Absolute docs directory for a project root.
    pub fn docs_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.docs_dir)
    }

    /// Absolute index path for a project root.
    pub fn index_path(&self, project_root: &Path) -> PathBuf {
        self.docs_root(project_root).join(&self.index_file)
    }
}

// ============================================================================
// Remote repository
// ============================================================================

/// An `owner/repo` pair plus a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to read from (or to target with pull requests).
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl RepoRef {
    /// Create a reference from its parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// `owner/repo` without the branch.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    /// Parses `owner/repo` or `owner/repo@branch`.
    fn from_str(s: &str) -> Result<Self> {
        let (slug, branch) = match s.split_once('@') {
            Some((slug, branch)) if !branch.trim().is_empty() => (slug, branch.trim().to_string()),
            Some(_) => return Err(Error::config(format!("Empty branch in '{s}'"))),
            None => (s, default_branch()),
        };
        let (owner, repo) = slug
            .split_once('/')
            .ok_or_else(|| Error::config(format!("Expected owner/repo, got '{s}'")))?;
        let (owner, repo) = (owner.trim(), repo.trim());
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(Error::config(format!("Expected owner/repo, got '{s}'")));
        }
        Ok(Self::new(owner, repo, branch))
    }
}

/// Where to fetch missing documents from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// Source repository.
    #[serde(flatten)]
    pub repo: RepoRef,
    /// Base URL of the content API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL of the raw-content host.
    #[serde(default = "default_raw_base")]
    pub raw_base: String,
    /// Per-request timeout.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Remote config with public GitHub endpoints.
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_base() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_fetch_timeout() -> u64 {
    15
}

// ============================================================================
// Commit side effect
// ============================================================================

/// Automation that proposes fetched documents back as a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommitConfig {
    /// Opt-in switch.
    pub enabled: bool,
    /// API credential. Required in addition to `enabled`.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Reviewers requested on new pull requests.
    pub reviewers: Vec<String>,
    /// Labels added to new pull requests.
    pub labels: Vec<String>,
    /// Repository path prefix the fetched file is committed under.
    pub path_prefix: String,
    /// Repository that receives the pull request (`owner/repo[@base]`).
    /// Defaults to the remote source repository.
    pub target: Option<String>,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: None,
            reviewers: Vec::new(),
            labels: Vec::new(),
            path_prefix: DEFAULT_DOCS_DIR.to_string(),
            target: None,
        }
    }
}

impl CommitConfig {
    /// The side effect runs only when enabled and a credential is present.
    pub fn is_active(&self) -> bool {
        self.enabled && self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Resolve the target repository, falling back to `default`.
    pub fn target_repo(&self, default: &RepoRef) -> Result<RepoRef> {
        match &self.target {
            Some(target) => target.parse(),
            None => Ok(default.clone()),
        }
    }
}

// ============================================================================
// Link checking
// ============================================================================

/// Link checker settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkCheckConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self { timeout_secs: 12 }
    }
}

/// Split a comma-separated list from a flag or environment variable.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
