//! Command handlers.
//!
//! Each handler takes resolved [`Settings`], does its work through the
//! library crates, and prints a short summary. Extracted text is the only
//! thing `extract` writes to stdout; diagnostics go to stderr.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use quire_content::{ensure_tree, normalize_tree, RewriteReport};
use quire_core::config::{split_list, QuireConfig, RemoteConfig};
use quire_core::Error as CoreError;
use quire_extract::{ExtractRequest, RemoteFallback, SectionExtractor};
use quire_index::{
    apply_tooling_links, collect_tooling_links, enrich_documents, DocsIndex, IndexBuilder,
};
use quire_remote::{ChangeProposer, GitHubProposer, GitHubSource, LinkChecker, RemoteFetcher};
use serde::Deserialize;

use crate::cli::{CacheMissingArgs, Command, ExtractArgs};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Run one command.
pub async fn run(command: &Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Index { output } => cmd_index(settings, output.as_deref()).await,
        Command::Extract(args) => cmd_extract(settings, args).await,
        Command::Normalize => cmd_normalize(settings).await,
        Command::EnsureFrontmatter => cmd_ensure_frontmatter(settings).await,
        Command::ToolingLinks => cmd_tooling_links(settings),
        Command::Enrich => cmd_enrich(settings).await,
        Command::CheckLinks => cmd_check_links(settings).await,
        Command::CacheMissing(args) => cmd_cache_missing(settings, args).await,
    }
}

// ============================================================================
// Index
// ============================================================================

/// Build the index and write it.
pub async fn cmd_index(settings: &Settings, output: Option<&Path>) -> Result<()> {
    let (index, stats) = IndexBuilder::new(settings.docs_root())
        .with_base(&settings.root)
        .build()
        .await?;

    let path = output.map_or_else(|| settings.index_path(), Path::to_path_buf);
    index.save(&path)?;

    for error in &stats.errors {
        tracing::warn!("Skipped {error}");
    }
    println!(
        "Wrote {} entries to {} ({} files scanned, {} skipped)",
        index.len(),
        path.display(),
        stats.files_scanned,
        stats.files_skipped
    );
    Ok(())
}

/// Resolve tooling links for every index entry and rewrite the index.
pub fn cmd_tooling_links(settings: &Settings) -> Result<()> {
    let path = settings.index_path();
    let mut index = DocsIndex::load(&path)?;
    let updated = apply_tooling_links(&mut index);
    index.save(&path)?;
    println!("Updated toolingLinks for {updated} entries in {}", path.display());
    Ok(())
}

/// Append reference sections to indexed documents.
pub async fn cmd_enrich(settings: &Settings) -> Result<()> {
    let index = DocsIndex::load(&settings.index_path())?;
    let report = enrich_documents(&index, &settings.root).await?;

    for missing in &report.missing {
        tracing::debug!("Indexed file missing: {}", missing.display());
    }
    for error in &report.errors {
        tracing::warn!("{error}");
    }
    println!("Enriched {} documents", report.enriched.len());
    for file in &report.enriched {
        println!("  {file}");
    }
    Ok(())
}

/// `HEAD`-check every tooling link in the index.
pub async fn cmd_check_links(settings: &Settings) -> Result<()> {
    let index = DocsIndex::load(&settings.index_path())?;
    let links = collect_tooling_links(&index);
    let checker = LinkChecker::new(settings.config.links.timeout_secs)?;
    let failures = checker.check_all(&links).await;

    if failures.is_empty() {
        println!("All tooling links reachable.");
        return Ok(());
    }

    eprintln!("Link check failed for:");
    for failure in &failures {
        eprintln!("{} -> {}", failure.file, failure.url);
        tracing::debug!("{}: {}", failure.url, failure.reason);
    }
    Err(Error::LinksFailed {
        failed: failures.len(),
        checked: links.len(),
    })
}

// ============================================================================
// Document rewriting
// ============================================================================

/// Normalize the headers of every document under the docs root.
pub async fn cmd_normalize(settings: &Settings) -> Result<()> {
    let report = normalize_tree(&settings.docs_root()).await?;
    print_rewrite_report("Normalized", &report, &settings.root);
    Ok(())
}

/// Add headers to markdown files under the project root that lack one.
pub async fn cmd_ensure_frontmatter(settings: &Settings) -> Result<()> {
    let report = ensure_tree(&settings.root).await?;
    print_rewrite_report("Added frontmatter to", &report, &settings.root);
    Ok(())
}

fn print_rewrite_report(verb: &str, report: &RewriteReport, root: &Path) {
    for error in &report.errors {
        tracing::warn!("{error}");
    }
    println!("{verb} {} of {} files", report.updated.len(), report.scanned);
    for path in &report.updated {
        println!("  {}", path.strip_prefix(root).unwrap_or(path).display());
    }
}

// ============================================================================
// Extraction and fetching
// ============================================================================

/// Print one section of a document.
pub async fn cmd_extract(settings: &Settings, args: &ExtractArgs) -> Result<()> {
    let started = Instant::now();

    let extractor =
        SectionExtractor::new(settings.docs_root()).with_fallback(remote_fallback(&settings.config)?);
    let request = ExtractRequest::new(&args.section, &args.target)
        .with_scope(args.scope())
        .with_version(args.version_range.clone());

    let result = extractor.extract(&request).await;
    tracing::info!(
        "extract {} {} finished in {:.1?}",
        args.section,
        args.target,
        started.elapsed()
    );

    let extracted = result?;
    if extracted.version_match.is_fallback() {
        tracing::warn!(
            "Version of {} compared as plain text; its declared version is not a valid range",
            extracted.document.display()
        );
    }
    if extracted.fetched_remotely {
        tracing::info!("Fetched {}", extracted.document.display());
    }
    println!("{}", extracted.text);
    Ok(())
}

/// Fetch each missing path into the docs root and propose it upstream.
pub async fn cmd_cache_missing(settings: &Settings, args: &CacheMissingArgs) -> Result<()> {
    let paths = missing_paths(args);
    if paths.is_empty() {
        return Err(Error::usage("no missing doc paths provided"));
    }

    let mut config = settings.config.clone();
    config.commit.enabled = true;
    let remote = config.remote.as_ref().ok_or_else(|| {
        Error::usage("no remote repository configured (set [remote] or --remote)")
    })?;
    if !config.commit.is_active() {
        tracing::warn!("No API token configured; fetched documents will not be proposed");
    }

    let fetcher = remote_fetcher(&config, remote)?;
    let docs_root = settings.docs_root();
    for path in &paths {
        match fetcher
            .fetch_and_cache(&remote.repo, std::slice::from_ref(path), &docs_root)
            .await
        {
            Ok(Some(cached)) => eprintln!("cached {}", cached.saved_path.display()),
            Ok(None) => eprintln!("failed to fetch {path}"),
            Err(e) => eprintln!("failed to fetch {path}: {e}"),
        }
    }
    Ok(())
}

fn remote_fetcher(config: &QuireConfig, remote: &RemoteConfig) -> Result<RemoteFetcher> {
    let source = GitHubSource::from_config(remote)?.with_token(config.commit.token.clone());
    let proposer = GitHubProposer::from_config(&config.commit, remote)?
        .map(|p| Arc::new(p) as Arc<dyn ChangeProposer>);
    Ok(RemoteFetcher::new(Arc::new(source)).with_proposer(proposer))
}

fn remote_fallback(config: &QuireConfig) -> Result<Option<RemoteFallback>> {
    let Some(remote) = &config.remote else {
        return Ok(None);
    };
    let fetcher = remote_fetcher(config, remote)?;
    Ok(Some(RemoteFallback::new(fetcher, remote.repo.clone())))
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    client_payload: Option<ClientPayload>,
}

#[derive(Debug, Deserialize)]
struct ClientPayload {
    #[serde(default)]
    paths: Vec<String>,
}

/// Paths to fetch: `--paths`, else the missing-docs list, else the event
/// payload.
pub fn missing_paths(args: &CacheMissingArgs) -> Vec<String> {
    if !args.paths.is_empty() {
        return split_list(&args.paths.join(","));
    }
    if let Some(raw) = &args.missing_docs {
        return parse_path_list(raw);
    }
    match &args.event_path {
        Some(event) => paths_from_event(event),
        None => Vec::new(),
    }
}

/// A JSON array of strings, or a comma-separated list.
pub fn parse_path_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(paths) => paths.into_iter().filter(|p| !p.trim().is_empty()).collect(),
        Err(_) => split_list(raw),
    }
}

fn paths_from_event(path: &Path) -> Vec<String> {
    let payload = std::fs::read_to_string(path)
        .map_err(|e| CoreError::io_with_path(e, path))
        .and_then(|content| serde_json::from_str::<EventPayload>(&content).map_err(CoreError::from));
    match payload {
        Ok(event) => event.client_payload.map(|c| c.paths).unwrap_or_default(),
        Err(e) => {
            tracing::error!("failed to read event payload: {e}");
            Vec::new()
        }
    }
}
