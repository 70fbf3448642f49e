//! Commit side effect for freshly cached documents.
//!
//! When enabled and given a credential, a cached document is committed to a
//! dedicated branch of the target repository and a pull request is opened
//! (or an open one reused). The branch name is derived from a hash of the
//! document path, so fetching the same path twice lands on the same branch.
//!
//! Callers treat every failure here as non-fatal.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quire_core::config::{CommitConfig, RemoteConfig};
use quire_core::{Error, RepoRef, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::fetch::USER_AGENT;

/// Prefix of every cache branch.
pub const BRANCH_PREFIX: &str = "quire/cache-";

/// Hex characters of the path hash kept in a branch name.
const BRANCH_HASH_LEN: usize = 12;

/// Deterministic branch name for a cached path.
///
/// ```
/// use quire_remote::commit::cache_branch_name;
///
/// let a = cache_branch_name("react.md");
/// assert!(a.starts_with("quire/cache-"));
/// assert_eq!(a, cache_branch_name("react.md"));
/// assert_ne!(a, cache_branch_name("vite.md"));
/// ```
pub fn cache_branch_name(relative: &str) -> String {
    let hash = blake3::hash(relative.as_bytes()).to_hex();
    format!("{BRANCH_PREFIX}{}", &hash[..BRANCH_HASH_LEN])
}

/// Result of a successful proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalOutcome {
    /// Branch the file was committed to.
    pub branch: String,
    /// Pull request number.
    pub number: u64,
    /// Pull request URL.
    pub url: String,
    /// Whether an already open pull request was reused.
    pub reused: bool,
}

impl fmt::Display for ProposalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.reused { "updated" } else { "opened" };
        write!(f, "{verb} PR #{} ({}) on {}", self.number, self.url, self.branch)
    }
}

/// Proposes a cached document back to its source repository.
#[async_trait]
pub trait ChangeProposer: Send + Sync {
    /// Commit `content` for `relative` and open or reuse a pull request.
    async fn propose(&self, relative: &str, content: &str) -> Result<ProposalOutcome>;
}

// ============================================================================
// GitHub implementation
// ============================================================================

/// [`ChangeProposer`] over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubProposer {
    client: Client,
    api_base: String,
    target: RepoRef,
    token: String,
    reviewers: Vec<String>,
    labels: Vec<String>,
    path_prefix: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct FileSha {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    html_url: String,
}

impl GitHubProposer {
    /// Proposer for `target` authenticated with `token`.
    pub fn new(api_base: &str, target: RepoRef, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::operation(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            target,
            token: token.into(),
            reviewers: Vec::new(),
            labels: Vec::new(),
            path_prefix: String::new(),
        })
    }

    /// Build from configuration.
    ///
    /// Returns `Ok(None)` when the side effect is disabled or no credential
    /// is configured.
    pub fn from_config(commit: &CommitConfig, remote: &RemoteConfig) -> Result<Option<Self>> {
        if !commit.is_active() {
            return Ok(None);
        }
        let Some(token) = commit.token.clone() else {
            return Ok(None);
        };
        let target = commit.target_repo(&remote.repo)?;
        let proposer = Self::new(&remote.api_base, target, token)?
            .with_reviewers(commit.reviewers.clone())
            .with_labels(commit.labels.clone())
            .with_path_prefix(&commit.path_prefix);
        Ok(Some(proposer))
    }

    /// Reviewers requested on new pull requests.
    pub fn with_reviewers(mut self, reviewers: Vec<String>) -> Self {
        self.reviewers = reviewers;
        self
    }

    /// Labels added to pull requests.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Directory in the target repository that cached files are written to.
    pub fn with_path_prefix(mut self, prefix: &str) -> Self {
        self.path_prefix = prefix.trim_matches('/').to_string();
        self
    }

    /// Path of `relative` inside the target repository.
    pub fn target_path(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        if self.path_prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{relative}", self.path_prefix)
        }
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{suffix}",
            self.api_base, self.target.owner, self.target.repo
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<reqwest::Response> {
        self.authed(request)
            .send()
            .await
            .map_err(|e| Error::remote(url, e.to_string()))
    }

    async fn expect_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(url, format!("status {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| Error::remote(url, format!("invalid response: {e}")))
    }

    async fn base_sha(&self) -> Result<String> {
        let url = self.repo_url(&format!("git/ref/heads/{}", self.target.branch));
        let response = self.send(self.client.get(&url), &url).await?;
        let git_ref: GitRef = Self::expect_json(response, &url).await?;
        Ok(git_ref.object.sha)
    }

    async fn ensure_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let url = self.repo_url("git/refs");
        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        let response = self.send(self.client.post(&url).json(&body), &url).await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            s if s == StatusCode::UNPROCESSABLE_ENTITY => {
                log::debug!("Branch {branch} already exists");
                Ok(())
            }
            s => Err(Error::remote(&url, format!("status {s}"))),
        }
    }

    async fn existing_file_sha(&self, file_path: &str, branch: &str) -> Result<Option<String>> {
        let url = self.repo_url(&format!("contents/{file_path}?ref={branch}"));
        let response = self.send(self.client.get(&url), &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let file: FileSha = Self::expect_json(response, &url).await?;
        Ok(Some(file.sha))
    }

    async fn put_file(&self, file_path: &str, branch: &str, content: &str) -> Result<()> {
        let sha = self.existing_file_sha(file_path, branch).await?;
        let url = self.repo_url(&format!("contents/{file_path}"));
        let mut body = json!({
            "message": format!("docs: cache {file_path}"),
            "content": STANDARD.encode(content),
            "branch": branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }
        let response = self.send(self.client.put(&url).json(&body), &url).await?;
        let _: serde_json::Value = Self::expect_json(response, &url).await?;
        Ok(())
    }

    async fn open_pull(&self, branch: &str) -> Result<Option<PullRequest>> {
        let url = self.repo_url(&format!(
            "pulls?state=open&head={}:{branch}",
            self.target.owner
        ));
        let response = self.send(self.client.get(&url), &url).await?;
        let pulls: Vec<PullRequest> = Self::expect_json(response, &url).await?;
        Ok(pulls.into_iter().next())
    }

    async fn create_pull(&self, branch: &str, file_path: &str) -> Result<PullRequest> {
        let url = self.repo_url("pulls");
        let body = json!({
            "title": format!("docs: cache {file_path}"),
            "head": branch,
            "base": self.target.branch,
            "body": format!("Adds `{file_path}`, fetched because it was missing from the local docs tree."),
        });
        let response = self.send(self.client.post(&url).json(&body), &url).await?;
        Self::expect_json(response, &url).await
    }

    async fn decorate(&self, number: u64) {
        if !self.reviewers.is_empty() {
            let url = self.repo_url(&format!("pulls/{number}/requested_reviewers"));
            let body = json!({ "reviewers": self.reviewers });
            if let Err(e) = self.post_ignoring_body(&url, &body).await {
                log::warn!("Failed to request reviewers on #{number}: {e}");
            }
        }
        if !self.labels.is_empty() {
            let url = self.repo_url(&format!("issues/{number}/labels"));
            let body = json!({ "labels": self.labels });
            if let Err(e) = self.post_ignoring_body(&url, &body).await {
                log::warn!("Failed to add labels to #{number}: {e}");
            }
        }
    }

    async fn post_ignoring_body(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let response = self.send(self.client.post(url).json(body), url).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::remote(url, format!("status {status}")))
        }
    }
}

#[async_trait]
impl ChangeProposer for GitHubProposer {
    async fn propose(&self, relative: &str, content: &str) -> Result<ProposalOutcome> {
        let branch = cache_branch_name(relative);
        let file_path = self.target_path(relative);

        let sha = self.base_sha().await?;
        self.ensure_branch(&branch, &sha).await?;
        self.put_file(&file_path, &branch, content).await?;

        let (pull, reused) = match self.open_pull(&branch).await? {
            Some(pull) => (pull, true),
            None => (self.create_pull(&branch, &file_path).await?, false),
        };
        self.decorate(pull.number).await;

        Ok(ProposalOutcome {
            branch,
            number: pull.number,
            url: pull.html_url,
            reused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target() -> RepoRef {
        RepoRef::new("acme", "standards", "main")
    }

    async fn mount_branch_setup(server: &MockServer, branch: &str) {
        Mock::given(method("GET"))
            .and(path("/repos/acme/standards/git/ref/heads/main"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"object": {"sha": "base123"}})),
            )
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/standards/git/refs"))
            .and(body_partial_json(
                json!({"ref": format!("refs/heads/{branch}"), "sha": "base123"}),
            ))
            .respond_with(ResponseTemplate::new(422))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_branch_name_shape() {
        let name = cache_branch_name("guides/react.md");
        let hash = name.strip_prefix(BRANCH_PREFIX).unwrap();
        assert_eq!(hash.len(), 12);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_target_path() {
        let p = GitHubProposer::new("http://x", target(), "t")
            .unwrap()
            .with_path_prefix("/docs/");
        assert_eq!(p.target_path("react.md"), "docs/react.md");
        let p = p.with_path_prefix("");
        assert_eq!(p.target_path("/react.md"), "react.md");
    }

    #[test]
    fn test_from_config_requires_enabled_and_token() {
        let remote = RemoteConfig::new(target());
        let mut commit = CommitConfig::default();
        assert!(GitHubProposer::from_config(&commit, &remote).unwrap().is_none());

        commit.enabled = true;
        assert!(GitHubProposer::from_config(&commit, &remote).unwrap().is_none());

        commit.token = Some("t".to_string());
        commit.target = Some("other/repo@dev".to_string());
        let proposer = GitHubProposer::from_config(&commit, &remote).unwrap().unwrap();
        assert_eq!(proposer.target, RepoRef::new("other", "repo", "dev"));
    }

    #[tokio::test]
    async fn test_propose_creates_pull_with_reviewers_and_labels() {
        let server = MockServer::start().await;
        let branch = cache_branch_name("react.md");
        mount_branch_setup(&server, &branch).await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/standards/contents/docs/react.md"))
            .and(query_param("ref", branch.as_str()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/acme/standards/contents/docs/react.md"))
            .and(body_partial_json(json!({
                "branch": &branch,
                "content": STANDARD.encode("# React"),
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"content": {}})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/standards/pulls"))
            .and(query_param("head", format!("acme:{branch}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/standards/pulls"))
            .and(body_partial_json(json!({"head": &branch, "base": "main"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                json!({"number": 7, "html_url": "https://github.com/acme/standards/pull/7"}),
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/standards/pulls/7/requested_reviewers"))
            .and(body_partial_json(json!({"reviewers": ["alice"]})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/standards/issues/7/labels"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let proposer = GitHubProposer::new(&server.uri(), target(), "t0ken")
            .unwrap()
            .with_path_prefix("docs")
            .with_reviewers(vec!["alice".to_string()])
            .with_labels(vec!["docs".to_string()]);

        let outcome = proposer.propose("react.md", "# React").await.unwrap();
        assert_eq!(outcome.number, 7);
        assert!(!outcome.reused);
        assert_eq!(outcome.branch, branch);
    }

    #[tokio::test]
    async fn test_propose_reuses_open_pull_and_updates_file() {
        let server = MockServer::start().await;
        let branch = cache_branch_name("vite.md");
        mount_branch_setup(&server, &branch).await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/standards/contents/vite.md"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "file456"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/acme/standards/contents/vite.md"))
            .and(body_partial_json(json!({"sha": "file456"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/standards/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!([{"number": 3, "html_url": "https://github.com/acme/standards/pull/3"}]),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/standards/pulls"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let proposer = GitHubProposer::new(&server.uri(), target(), "t0ken").unwrap();
        let outcome = proposer.propose("vite.md", "# Vite").await.unwrap();
        assert_eq!(outcome.number, 3);
        assert!(outcome.reused);
    }

    #[tokio::test]
    async fn test_propose_fails_when_base_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let proposer = GitHubProposer::new(&server.uri(), target(), "t0ken").unwrap();
        let err = proposer.propose("x.md", "x").await.unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
    }
}
