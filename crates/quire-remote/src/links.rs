//! Link reachability checks.
//!
//! Each URL gets a single `HEAD` request bounded by a timeout. Anything
//! other than a 2xx answer counts as a failure.

use std::time::Duration;

use quire_core::{Error, Result};
use reqwest::Client;

use crate::fetch::USER_AGENT;

/// A link that could not be confirmed reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    /// Index file the link belongs to.
    pub file: String,
    /// The URL that failed.
    pub url: String,
    /// Status or transport error.
    pub reason: String,
}

/// Checks URLs with `HEAD` requests.
#[derive(Debug, Clone)]
pub struct LinkChecker {
    client: Client,
}

impl LinkChecker {
    /// Checker with a per-request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::operation(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Check one URL. `Err` carries the reason it is unreachable.
    pub async fn check(&self, url: &str) -> std::result::Result<(), String> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("status {status}"))
        }
    }

    /// Check `(file, url)` pairs in order, returning the failures.
    pub async fn check_all(&self, links: &[(String, String)]) -> Vec<LinkFailure> {
        let mut failures = Vec::new();
        for (file, url) in links {
            match self.check(url).await {
                Ok(()) => log::debug!("OK {url}"),
                Err(reason) => {
                    log::debug!("FAIL {url}: {reason}");
                    failures.push(LinkFailure {
                        file: file.clone(),
                        url: url.clone(),
                        reason,
                    });
                }
            }
        }
        failures
    }
}
