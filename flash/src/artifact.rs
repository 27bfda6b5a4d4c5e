use crate::errors::{FlashError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Write;

/// A workflow artifact as returned by the GitHub Actions REST API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size_in_bytes: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expired: bool,
}

/// `GET /repos/{owner}/{repo}/actions/artifacts` response body.
#[derive(Debug, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// Where workflow artifacts come from.
pub trait ArtifactSource {
    /// List artifacts for the configured repository (first page only).
    fn list_artifacts(&self) -> Result<Vec<Artifact>>;

    /// Write the artifact's ZIP archive into `dest`, returning the byte count.
    fn download_artifact(&self, artifact: &Artifact, dest: &mut dyn Write) -> Result<u64>;
}

/// Pick the most recently created artifact and make sure it can still be downloaded.
pub fn select_latest(artifacts: &[Artifact]) -> std::result::Result<&Artifact, FlashError> {
    let latest = artifacts
        .iter()
        .max_by_key(|a| a.created_at)
        .ok_or(FlashError::NoArtifacts)?;

    if latest.expired {
        return Err(FlashError::ArtifactExpired {
            id: latest.id,
            name: latest.name.clone(),
        });
    }

    Ok(latest)
}
