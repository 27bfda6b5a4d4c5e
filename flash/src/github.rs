//! Minimal GitHub Actions artifacts client.
//!
//! Only two endpoints are used: list artifacts for a repository and download
//! one artifact's ZIP. The download endpoint answers with a redirect to
//! short-lived blob storage; that URL is fetched with a separate client that
//! never sends the token.

use crate::artifact::{Artifact, ArtifactList, ArtifactSource};
use crate::config::EnvSettings;
use crate::download::{download_with_progress, write_response};
use crate::errors::{FlashError, Result};
use anyhow::{anyhow, Context};
use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::io::Write;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("flash/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
/// Only the first page of the listing is ever requested.
const PER_PAGE: &str = "100";
/// Same-host API redirects (renamed or transferred repositories) followed.
const MAX_API_REDIRECTS: usize = 5;

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

pub struct GithubClient {
    api: Client,
    blobs: Client,
    base: Url,
    token: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    pub fn new(api_url: &str, token: &str, owner: &str, repo: &str) -> Result<Self> {
        let mut base =
            Url::parse(api_url).with_context(|| format!("Invalid GitHub API URL: {}", api_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .timeout(None::<Duration>)
            .build()
            .context("failed to build GitHub API client")?;
        let blobs = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(10))
            .timeout(None::<Duration>)
            .build()
            .context("failed to build download client")?;

        Ok(Self {
            api,
            blobs,
            base,
            token: token.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn from_settings(settings: &EnvSettings) -> Result<Self> {
        Self::new(
            &settings.api_url,
            &settings.token,
            &settings.owner,
            &settings.repo,
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let path = format!("repos/{}/{}/{}", self.owner, self.repo, path);
        self.base
            .join(&path)
            .with_context(|| format!("Invalid API path {}", path))
    }

    fn authorized(&self, url: Url) -> RequestBuilder {
        self.api
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Send an authorized GET, following redirects only while they stay on
    /// the API origin so the token never leaves it.
    fn get_api(&self, url: Url) -> Result<Response> {
        let mut url = url;
        for _ in 0..=MAX_API_REDIRECTS {
            let response = self
                .authorized(url.clone())
                .send()
                .with_context(|| format!("Failed to reach {}", url))?;
            if !response.status().is_redirection() {
                return Ok(response);
            }

            let next = redirect_target(&url, &response)?;
            if next.origin() != self.base.origin() {
                return Err(anyhow!(
                    "GitHub API redirected to another host ({}); refusing to send credentials",
                    next.host_str().unwrap_or("<unknown>")
                ));
            }
            debug!("GitHub API moved {} -> {}", url, next);
            url = next;
        }
        Err(anyhow!(
            "GitHub API redirected more than {} times",
            MAX_API_REDIRECTS
        ))
    }

    pub fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        let mut url = self.endpoint("actions/artifacts")?;
        url.query_pairs_mut().append_pair("per_page", PER_PAGE);
        info!("🔎 Listing artifacts for {}/{}", self.owner, self.repo);

        let response = self.get_api(url)?;
        if !response.status().is_success() {
            return Err(api_error(response).into());
        }

        let list: ArtifactList = response
            .json()
            .context("Failed to parse GitHub artifact listing")?;
        debug!(
            "GitHub reports {} artifacts, {} on this page",
            list.total_count,
            list.artifacts.len()
        );
        Ok(list.artifacts)
    }

    pub fn download_artifact(&self, artifact: &Artifact, dest: &mut dyn Write) -> Result<u64> {
        let url = self.endpoint(&format!("actions/artifacts/{}/zip", artifact.id))?;
        info!("⬇️ Requesting artifact {} (#{})", artifact.name, artifact.id);

        let response = self
            .authorized(url.clone())
            .send()
            .with_context(|| format!("Failed to reach {}", url))?;
        let status = response.status();
        let description = format!("Artifact {}", artifact.name);

        if status.is_redirection() {
            let blob_url = redirect_target(&url, &response)?;
            debug!("Artifact blob at {}", blob_url.host_str().unwrap_or("<unknown>"));
            download_with_progress(&self.blobs, blob_url.as_str(), dest, &description)
        } else if status.is_success() {
            write_response(response, dest, &description)
        } else {
            Err(api_error(response).into())
        }
    }
}

impl ArtifactSource for GithubClient {
    fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        GithubClient::list_artifacts(self)
    }

    fn download_artifact(&self, artifact: &Artifact, dest: &mut dyn Write) -> Result<u64> {
        GithubClient::download_artifact(self, artifact, dest)
    }
}

/// Resolve a redirect's `Location` against the URL that produced it.
fn redirect_target(from: &Url, response: &Response) -> Result<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            anyhow!(
                "GitHub returned {} without a Location header",
                response.status()
            )
        })?;
    from.join(location)
        .with_context(|| format!("Invalid redirect location {}", location))
}

/// Turn a non-success API response into [`FlashError::Api`], keeping
/// GitHub's `message` when the body has one.
fn api_error(response: Response) -> FlashError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiMessage>(&body)
        .map(|m| m.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                trimmed.to_string()
            }
        });
    FlashError::Api {
        status: status.as_u16(),
        message,
    }
}
