//! Section extraction.
//!
//! [`SectionExtractor`] finds a document by id or filename, optionally
//! filtered by scope and version, and returns the text under one of its
//! `##` headings. When nothing matches locally and a [`RemoteFallback`] is
//! configured, the document is fetched into the docs root and checked
//! against the same filters.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use quire_content::{extract_frontmatter, extract_section, Frontmatter};
use quire_core::util::ids::{file_stem, to_slash};
use quire_core::{find_all_files, Error, FindOptions, RepoRef, Result};
use quire_remote::RemoteFetcher;

use crate::scope::scope_field_matches;
use crate::version::{match_version, MatchOutcome};

/// Minimum Jaro-Winkler similarity for a suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Maximum number of suggestions on a failed lookup.
pub const MAX_SUGGESTIONS: usize = 5;

/// What to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    /// Section key, e.g. `code-style`.
    pub section: String,
    /// Document id, filename, or path suffix.
    pub target: String,
    /// Required scope, if any.
    pub scope: Option<String>,
    /// Requested version range, if any.
    pub version: Option<String>,
}

impl ExtractRequest {
    /// Request a section of a document with no filters.
    pub fn new(section: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            target: target.into(),
            scope: None,
            version: None,
        }
    }

    /// Only accept documents whose scope allows `scope`.
    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope.filter(|s| !s.trim().is_empty());
        self
    }

    /// Only accept documents whose version satisfies `version`.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version.filter(|v| !v.trim().is_empty());
        self
    }
}

/// A document chosen for a request.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    /// Where the document lives on disk.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
    /// How the version filter was satisfied.
    pub version_match: MatchOutcome,
    /// Whether the document was fetched from the remote repository.
    pub fetched_remotely: bool,
}

/// An extracted section.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// The document the text came from.
    pub document: PathBuf,
    /// Section text, trimmed.
    pub text: String,
    /// How the version filter was satisfied.
    pub version_match: MatchOutcome,
    /// Whether the document was fetched from the remote repository.
    pub fetched_remotely: bool,
}

/// Remote repository to try when a document is missing locally.
#[derive(Debug, Clone)]
pub struct RemoteFallback {
    fetcher: RemoteFetcher,
    repo: RepoRef,
}

impl RemoteFallback {
    /// Fetch from `repo` through `fetcher`.
    pub fn new(fetcher: RemoteFetcher, repo: RepoRef) -> Self {
        Self { fetcher, repo }
    }
}

/// Remote paths tried for a document id, in order.
///
/// ```rust
/// use quire_extract::extractor::remote_candidates;
///
/// assert_eq!(
///     remote_candidates("react"),
///     vec!["react.md", "docs/react.md", "react/index.md", "docs/react/index.md"]
/// );
/// ```
pub fn remote_candidates(target: &str) -> Vec<String> {
    let id = target.trim().trim_matches('/');
    let id = id.strip_suffix(".md").unwrap_or(id);
    vec![
        format!("{id}.md"),
        format!("docs/{id}.md"),
        format!("{id}/index.md"),
        format!("docs/{id}/index.md"),
    ]
}

/// Resolves documents and extracts their sections.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    docs_root: PathBuf,
    options: FindOptions,
    fallback: Option<RemoteFallback>,
}

impl SectionExtractor {
    /// Extractor over markdown files under `docs_root`.
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
            options: FindOptions::markdown(),
            fallback: None,
        }
    }

    /// Fetch missing documents from a remote repository.
    pub fn with_fallback(mut self, fallback: Option<RemoteFallback>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Override which files are considered.
    pub fn with_find_options(mut self, options: FindOptions) -> Self {
        self.options = options;
        self
    }

    /// The docs root.
    pub fn docs_root(&self) -> &Path {
        &self.docs_root
    }

    /// Extract the requested section.
    ///
    /// # Errors
    ///
    /// [`Error::DocumentNotFound`] when no document resolves, and
    /// [`Error::SectionNotFound`] when the document lacks the heading.
    pub async fn extract(&self, request: &ExtractRequest) -> Result<Extracted> {
        let doc = self.resolve(request).await?;
        let body = extract_frontmatter(&doc.content).body();

        let text = extract_section(body, &request.section).ok_or_else(|| Error::SectionNotFound {
            section: request.section.clone(),
            document: doc.path.clone(),
        })?;

        Ok(Extracted {
            document: doc.path,
            text,
            version_match: doc.version_match,
            fetched_remotely: doc.fetched_remotely,
        })
    }

    /// Find the document a request refers to.
    ///
    /// Local files are tried in walk order and the first candidate passing
    /// the scope and version filters wins. Files that cannot be read are
    /// skipped.
    pub async fn resolve(&self, request: &ExtractRequest) -> Result<ResolvedDocument> {
        let target = request.target.trim();
        if target.is_empty() {
            return Err(Error::DocumentNotFound {
                target: request.target.clone(),
                suggestions: Vec::new(),
            });
        }

        let files = match find_all_files(&self.docs_root, &self.options).await {
            Ok(files) => files,
            Err(e) => {
                log::warn!("Cannot walk {:?}: {e}", self.docs_root);
                Vec::new()
            }
        };

        let mut known: Vec<(String, String)> = Vec::new();
        for path in files {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    log::debug!("Skipping unreadable {:?}: {e}", path);
                    continue;
                }
            };
            let frontmatter = extract_frontmatter(&content).into_frontmatter();
            known.push(suggestion_names(&path, frontmatter.as_ref()));

            if !is_candidate(target, &path, frontmatter.as_ref()) {
                continue;
            }
            match check_filters(request, frontmatter.as_ref()) {
                Some(version_match) => {
                    log::debug!("Resolved {target:?} to {:?}", path);
                    return Ok(ResolvedDocument {
                        path,
                        content,
                        version_match,
                        fetched_remotely: false,
                    });
                }
                None => log::debug!("Candidate {:?} filtered out by scope or version", path),
            }
        }

        if let Some(doc) = self.resolve_remote(request, target).await? {
            return Ok(doc);
        }

        Err(Error::DocumentNotFound {
            target: target.to_string(),
            suggestions: suggest(target, &known),
        })
    }

    async fn resolve_remote(
        &self,
        request: &ExtractRequest,
        target: &str,
    ) -> Result<Option<ResolvedDocument>> {
        let Some(fallback) = &self.fallback else {
            return Ok(None);
        };

        log::debug!("{target:?} not found locally, trying {}", fallback.repo);
        let Some(cached) = fallback
            .fetcher
            .fetch_and_cache(&fallback.repo, &remote_candidates(target), &self.docs_root)
            .await?
        else {
            return Ok(None);
        };

        let content = match tokio::fs::read_to_string(&cached.saved_path).await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Cannot read fetched {:?}: {e}", cached.saved_path);
                return Ok(None);
            }
        };
        let frontmatter = extract_frontmatter(&content).into_frontmatter();
        let Some(version_match) = check_filters(request, frontmatter.as_ref()) else {
            log::debug!("Fetched {:?} filtered out by scope or version", cached.saved_path);
            return Ok(None);
        };

        Ok(Some(ResolvedDocument {
            path: cached.saved_path,
            content,
            version_match,
            fetched_remotely: true,
        }))
    }
}

/// Whether a file is a candidate for `target` by id or path.
fn is_candidate(target: &str, path: &Path, frontmatter: Option<&Frontmatter>) -> bool {
    if frontmatter.and_then(|fm| fm.get_text("id")) == Some(target) {
        return true;
    }
    let path = to_slash(path);
    path.ends_with(&format!("/{target}.md")) || path.ends_with(target)
}

/// The version outcome when a document passes the request's filters.
fn check_filters(request: &ExtractRequest, frontmatter: Option<&Frontmatter>) -> Option<MatchOutcome> {
    if let Some(scope) = &request.scope {
        if !scope_field_matches(scope, frontmatter.and_then(|fm| fm.get("scope"))) {
            return None;
        }
    }

    let declared = frontmatter
        .and_then(|fm| fm.get("version"))
        .map(|v| v.to_text());
    let outcome = match_version(declared.as_deref(), request.version.as_deref());
    outcome.is_match().then_some(outcome)
}

/// The id (or file stem) and title a document is suggested under.
fn suggestion_names(path: &Path, frontmatter: Option<&Frontmatter>) -> (String, String) {
    let id = frontmatter
        .and_then(|fm| fm.non_empty_text("id"))
        .map(String::from)
        .or_else(|| file_stem(path))
        .unwrap_or_default();
    let title = frontmatter
        .and_then(|fm| fm.non_empty_text("title"))
        .map(String::from)
        .unwrap_or_default();
    (id, title)
}

/// Rank known documents by similarity to `target`.
///
/// Each document scores the better of its id and title; ids above
/// [`SUGGESTION_THRESHOLD`] are returned best first, at most
/// [`MAX_SUGGESTIONS`] of them.
pub fn suggest(target: &str, known: &[(String, String)]) -> Vec<String> {
    let needle = target.to_lowercase();
    let mut scored: Vec<(f64, &str)> = known
        .iter()
        .filter(|(id, _)| !id.is_empty())
        .filter_map(|(id, title)| {
            let by_id = strsim::jaro_winkler(&needle, &id.to_lowercase());
            let by_title = strsim::jaro_winkler(&needle, &title.to_lowercase());
            let score = by_id.max(by_title);
            (score > SUGGESTION_THRESHOLD).then_some((score, id.as_str()))
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(_, id)| seen.insert(*id))
        .take(MAX_SUGGESTIONS)
        .map(|(_, id)| id.to_string())
        .collect()
}
