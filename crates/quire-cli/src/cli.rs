//! Command-line definitions.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use quire_core::RepoRef;

/// Quire: documentation repository maintenance.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project root (defaults to the nearest ancestor with quire.toml or .git).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/quire.toml when present).
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit debug diagnostics on stderr.
    #[arg(
        long,
        global = true,
        env = "QUIRE_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Remote repository for missing documents.
    #[arg(long, global = true, env = "QUIRE_REMOTE", value_name = "OWNER/REPO[@BRANCH]")]
    pub remote: Option<RepoRef>,

    /// Propose fetched documents back as a pull request.
    #[arg(
        long,
        global = true,
        env = "QUIRE_AUTO_COMMIT",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub auto_commit: bool,

    /// API token for the remote repository and pull requests.
    #[arg(long, global = true, env = "QUIRE_GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Reviewers requested on pull requests (comma-separated).
    #[arg(long, global = true, env = "QUIRE_REVIEWERS", value_delimiter = ',')]
    pub reviewers: Vec<String>,

    /// Labels added to pull requests (comma-separated).
    #[arg(long, global = true, env = "QUIRE_LABELS", value_delimiter = ',')]
    pub labels: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the docs index from document headers.
    Index {
        /// Write the index here instead of the configured path.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print one section of a document.
    Extract(ExtractArgs),

    /// Rewrite document headers into canonical form.
    Normalize,

    /// Add a generated header to markdown files that lack one.
    EnsureFrontmatter,

    /// Resolve topics and scopes to tool documentation links in the index.
    ToolingLinks,

    /// Append a references section to indexed documents.
    Enrich,

    /// Check that every tooling link in the index is reachable.
    CheckLinks,

    /// Fetch a list of missing documents and propose them upstream.
    CacheMissing(CacheMissingArgs),
}

/// Arguments for `quire extract`.
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Section key, e.g. `code-style`.
    pub section: String,

    /// Document id, filename, or path suffix.
    pub target: String,

    /// Required scope (same as --scope).
    #[arg(value_name = "SCOPE")]
    pub scope_arg: Option<String>,

    /// Required scope; wins over the positional form.
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<String>,

    /// Version range the document must satisfy.
    #[arg(long = "version", value_name = "RANGE")]
    pub version_range: Option<String>,
}

impl ExtractArgs {
    /// The effective scope.
    pub fn scope(&self) -> Option<String> {
        self.scope.clone().or_else(|| self.scope_arg.clone())
    }
}

/// Arguments for `quire cache-missing`.
#[derive(Args, Debug, Clone, Default)]
pub struct CacheMissingArgs {
    /// Remote paths to fetch (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub paths: Vec<String>,

    /// JSON array or comma-separated list of paths.
    #[arg(long, env = "QUIRE_MISSING_DOCS", hide = true)]
    pub missing_docs: Option<String>,

    /// Event payload with `client_payload.paths`.
    #[arg(long, env = "GITHUB_EVENT_PATH", value_name = "FILE")]
    pub event_path: Option<PathBuf>,
}
