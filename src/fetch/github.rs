use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::error::FetchError;
use crate::models::GitHubRef;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("license-plist/", env!("CARGO_PKG_VERSION"));

/// Fetches license text through the GitHub REST API.
///
/// When a repository has no license of its own but is a fork, the parent's
/// license is used instead.
pub struct GitHubFetcher {
    client: Client,
    api_base: String,
}

impl GitHubFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: API_BASE.to_string(),
        })
    }

    fn get(&self, url: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.get(url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `Ok(None)` when the repository has no detectable license.
    async fn license_text(
        &self,
        repo: &GitHubRef,
        token: Option<&str>,
    ) -> Result<Option<String>, FetchError> {
        let url = format!("{}/repos/{}/{}/license", self.api_base, repo.owner, repo.repo);
        let response = self
            .get(&url, token)
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await
            .map_err(|source| transport(repo, source))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .text()
                .await
                .map(Some)
                .map_err(|source| transport(repo, source)),
            status => Err(FetchError::Status {
                repo: repo.full_name(),
                status: status.as_u16(),
            }),
        }
    }

    /// The repository a fork was created from, if any.
    async fn fork_parent(
        &self,
        repo: &GitHubRef,
        token: Option<&str>,
    ) -> Result<Option<GitHubRef>, FetchError> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo);
        let response = self
            .get(&url, token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|source| transport(repo, source))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|source| transport(repo, source))?;
        Ok(parent_from_repo_json(&data))
    }
}

#[async_trait]
impl super::LicenseFetch for GitHubFetcher {
    async fn fetch(&self, repo: &GitHubRef, token: Option<&str>) -> Result<String, FetchError> {
        if let Some(text) = self.license_text(repo, token).await? {
            return Ok(text);
        }

        if let Some(parent) = self.fork_parent(repo, token).await? {
            debug!("{} is a fork of {}", repo.full_name(), parent.full_name());
            if let Some(text) = self.license_text(&parent, token).await? {
                return Ok(text);
            }
        }

        Err(FetchError::NotFound(repo.full_name()))
    }
}

fn transport(repo: &GitHubRef, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        repo: repo.full_name(),
        source,
    }
}

fn parent_from_repo_json(data: &serde_json::Value) -> Option<GitHubRef> {
    data.get("parent")
        .and_then(|p| p.get("full_name"))
        .and_then(|n| n.as_str())
        .and_then(GitHubRef::parse)
}
