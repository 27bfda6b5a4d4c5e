//! ⌨️ flash library.
//!
//! Pushes the newest Glove80 firmware artifact from GitHub Actions onto both
//! keyboard halves while they sit in bootloader mass-storage mode.

pub mod artifact;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod distribute;
pub mod download;
pub mod errors;
pub mod extract;
pub mod github;
pub mod logging;
pub mod pipeline;
pub mod preflight;

use crate::config::{EnvSettings, FlashConfig};
use crate::errors::Result;
use crate::github::GithubClient;
use crate::pipeline::FlashReport;
use anyhow::Context;

/// Resolve configuration and run the pipeline for a parsed command line.
pub fn run(cli: &cli::Cli) -> Result<FlashReport> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("Failed to load .env"),
    }

    let settings = EnvSettings::from_env()?;
    log::debug!("{:?}", settings);

    let work_dir = std::env::current_dir().context("Unable to determine working directory")?;
    let cfg = FlashConfig::new(&settings.owner, &settings.repo, cli.directory.clone())
        .with_work_dir(work_dir)
        .with_dry_run(cli.dry_run);

    let client = GithubClient::from_settings(&settings)?;
    pipeline::run(&cfg, &client)
}
