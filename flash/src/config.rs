use crate::errors::FlashError;
use std::env;
use std::path::PathBuf;

pub const OWNER_VAR: &str = "OWNER";
pub const REPO_VAR: &str = "REPO";
pub const TOKEN_VAR: &str = "GITHUB_PAT";
pub const API_URL_VAR: &str = "GITHUB_API_URL";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Settings read from the process environment (and `.env`, if present).
#[derive(Clone)]
pub struct EnvSettings {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub api_url: String,
}

impl std::fmt::Debug for EnvSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSettings")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl EnvSettings {
    pub fn from_env() -> Result<Self, FlashError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary lookup. Every missing required
    /// variable is reported at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FlashError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let owner = get(OWNER_VAR);
        let repo = get(REPO_VAR);
        let token = get(TOKEN_VAR);

        match (owner, repo, token) {
            (Some(owner), Some(repo), Some(token)) => Ok(Self {
                owner,
                repo,
                token,
                api_url: get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            }),
            (owner, repo, token) => {
                let names = [(OWNER_VAR, owner), (REPO_VAR, repo), (TOKEN_VAR, token)]
                    .into_iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name)
                    .collect();
                Err(FlashError::MissingEnv { names })
            }
        }
    }
}

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone)]
pub struct FlashConfig {
    pub owner: String,
    pub repo: String,
    /// Parent directory the two halves mount under.
    pub mount_dir: PathBuf,
    /// Where the archive is downloaded and the payload extracted.
    pub work_dir: PathBuf,
    pub dry_run: bool,
}

impl FlashConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, mount_dir: PathBuf) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            mount_dir,
            work_dir: PathBuf::from("."),
            dry_run: false,
        }
    }

    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
