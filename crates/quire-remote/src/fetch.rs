//! Remote fetch with API-then-raw fallback.
//!
//! A [`RemoteSource`] offers two channels for reading a file from a
//! repository: a content API (which may answer with a base64 JSON envelope)
//! and a raw-content URL. [`RemoteFetcher::fetch_and_cache`] walks an
//! ordered list of candidate paths, trying the API first and the raw URL
//! only when the API yields nothing, and saves the first non-empty hit
//! under a destination directory.
//!
//! Failures on one candidate or channel are logged at debug level and
//! treated as a miss.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quire_core::config::RemoteConfig;
use quire_core::{write_atomic, Error, RepoRef, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::commit::ChangeProposer;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("quire/", env!("CARGO_PKG_VERSION"));

/// Which channel produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// The content API.
    Api,
    /// The raw-content URL.
    Raw,
}

/// A document fetched and written locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDoc {
    /// Where the document was saved.
    pub saved_path: PathBuf,
    /// The candidate path that succeeded.
    pub relative: String,
    /// The channel that produced it.
    pub channel: Channel,
}

/// Read access to files in a remote repository.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch through the content API. `Ok(None)` means the file is absent.
    async fn fetch_from_api(&self, repo: &RepoRef, path: &str) -> Result<Option<String>>;

    /// Fetch through the raw-content URL. `Ok(None)` means the file is absent.
    async fn fetch_raw(&self, repo: &RepoRef, path: &str) -> Result<Option<String>>;
}

// ============================================================================
// GitHub source
// ============================================================================

/// [`RemoteSource`] backed by the GitHub contents API and
/// `raw.githubusercontent.com`.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
    content: Option<String>,
    encoding: Option<String>,
}

impl GitHubSource {
    /// Source using the endpoints and timeout from `config`.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::new(&config.api_base, &config.raw_base, config.timeout_secs)
    }

    /// Source with explicit endpoints and a per-request timeout.
    pub fn new(api_base: &str, raw_base: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::operation(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Authenticate API requests.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    fn api_url(&self, repo: &RepoRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base, repo.owner, repo.repo, path, repo.branch
        )
    }

    fn raw_url(&self, repo: &RepoRef, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base, repo.owner, repo.repo, repo.branch, path
        )
    }
}

#[async_trait]
impl RemoteSource for GitHubSource {
    async fn fetch_from_api(&self, repo: &RepoRef, path: &str) -> Result<Option<String>> {
        let url = self.api_url(repo, path);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::remote(&url, e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::remote(&url, format!("status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::remote(&url, e.to_string()))?;
        decode_api_body(&body).map_err(|message| Error::remote(&url, message))
    }

    async fn fetch_raw(&self, repo: &RepoRef, path: &str) -> Result<Option<String>> {
        let url = self.raw_url(repo, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::remote(&url, e.to_string()))?;
        if !response.status().is_success() {
            log::debug!("Raw fetch {url} returned {}", response.status());
            return Ok(None);
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::remote(&url, e.to_string()))?;
        Ok(Some(body))
    }
}

/// Interpret a content API body.
///
/// A JSON envelope with `encoding: base64` is decoded and an envelope with
/// plain `content` is used as is. A JSON array is a directory listing and
/// counts as a miss. Anything else is taken as the raw file.
pub fn decode_api_body(body: &str) -> std::result::Result<Option<String>, String> {
    if body.trim_start().starts_with('[')
        && serde_json::from_str::<Vec<serde_json::Value>>(body).is_ok()
    {
        return Ok(None);
    }
    let Ok(envelope) = serde_json::from_str::<ContentsEnvelope>(body) else {
        return Ok(Some(body.to_string()));
    };
    let Some(content) = envelope.content else {
        return Ok(None);
    };
    if envelope.encoding.as_deref() != Some("base64") {
        return Ok(Some(content));
    }

    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned)
        .map_err(|e| format!("invalid base64 content: {e}"))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| format!("content is not UTF-8: {e}"))
}

// ============================================================================
// Fetch loop
// ============================================================================

/// Fetches candidate paths and caches the first hit.
#[derive(Clone)]
pub struct RemoteFetcher {
    source: Arc<dyn RemoteSource>,
    proposer: Option<Arc<dyn ChangeProposer>>,
}

impl std::fmt::Debug for RemoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFetcher")
            .field("proposer", &self.proposer.is_some())
            .finish_non_exhaustive()
    }
}

impl RemoteFetcher {
    /// Fetcher over `source` without a commit side effect.
    pub fn new(source: Arc<dyn RemoteSource>) -> Self {
        Self {
            source,
            proposer: None,
        }
    }

    /// Propose every newly cached document through `proposer`.
    pub fn with_proposer(mut self, proposer: Option<Arc<dyn ChangeProposer>>) -> Self {
        self.proposer = proposer;
        self
    }

    /// Try each candidate in order and save the first non-empty document
    /// under `dest_dir`.
    ///
    /// Returns `Ok(None)` when every candidate misses on both channels.
    ///
    /// # Errors
    ///
    /// Only a failure to write the fetched document locally is returned.
    pub async fn fetch_and_cache(
        &self,
        repo: &RepoRef,
        candidates: &[String],
        dest_dir: &Path,
    ) -> Result<Option<CachedDoc>> {
        for rel in candidates {
            let Some(dest) = safe_join(dest_dir, rel) else {
                log::warn!("Refusing to cache outside {:?}: {rel}", dest_dir);
                continue;
            };
            let Some((content, channel)) = self.fetch_candidate(repo, rel).await else {
                continue;
            };

            write_atomic(&dest, &content)?;
            log::info!("Cached {repo}:{rel} to {:?} via {channel:?}", dest);

            if let Some(proposer) = &self.proposer {
                match proposer.propose(rel, &content).await {
                    Ok(outcome) => log::info!("Proposed {rel}: {outcome}"),
                    Err(e) => log::warn!("Commit side effect failed for {rel}: {e}"),
                }
            }

            return Ok(Some(CachedDoc {
                saved_path: dest,
                relative: rel.clone(),
                channel,
            }));
        }
        Ok(None)
    }

    async fn fetch_candidate(&self, repo: &RepoRef, rel: &str) -> Option<(String, Channel)> {
        match self.source.fetch_from_api(repo, rel).await {
            Ok(Some(content)) if !content.trim().is_empty() => return Some((content, Channel::Api)),
            Ok(_) => log::debug!("API miss for {rel}"),
            Err(e) => log::debug!("API attempt failed for {rel}: {e}"),
        }
        match self.source.fetch_raw(repo, rel).await {
            Ok(Some(content)) if !content.trim().is_empty() => Some((content, Channel::Raw)),
            Ok(_) => {
                log::debug!("Raw miss for {rel}");
                None
            }
            Err(e) => {
                log::debug!("Raw attempt failed for {rel}: {e}");
                None
            }
        }
    }
}

/// Join a remote relative path onto `base`, rejecting absolute paths and
/// parent components.
fn safe_join(base: &Path, rel: &str) -> Option<PathBuf> {
    let rel_path = Path::new(rel);
    let clean = rel_path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    (clean && !rel.is_empty()).then(|| base.join(rel_path))
}
