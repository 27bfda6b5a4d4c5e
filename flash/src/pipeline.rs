//! The flash pipeline: check devices, pick an artifact, fetch, extract, copy.

use crate::artifact::{self, Artifact, ArtifactSource};
use crate::cleanup::ScratchFile;
use crate::config::FlashConfig;
use crate::distribute;
use crate::errors::Result;
use crate::extract;
use crate::preflight;
use anyhow::Context;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Temporary name for the downloaded artifact archive.
pub const ARCHIVE_FILE_NAME: &str = "temp.zip";
/// Firmware image expected inside the archive.
pub const PAYLOAD_FILE_NAME: &str = "glove80.uf2";

/// What a run did.
#[derive(Debug, Clone)]
pub struct FlashReport {
    pub artifact: Artifact,
    /// Files written to the devices, in flashing order. Empty on a dry run.
    pub written: Vec<PathBuf>,
    /// Size of the downloaded artifact ZIP. Zero on a dry run.
    pub archive_bytes: u64,
    pub dry_run: bool,
}

pub fn run(cfg: &FlashConfig, source: &dyn ArtifactSource) -> Result<FlashReport> {
    info!("⌨️ Flashing latest build of {}/{}", cfg.owner, cfg.repo);

    let targets = preflight::check_mounts(&cfg.mount_dir)?;

    let artifacts = source
        .list_artifacts()
        .with_context(|| format!("Failed to list artifacts for {}/{}", cfg.owner, cfg.repo))?;
    let latest = artifact::select_latest(&artifacts)?.clone();
    info!(
        "📌 Latest artifact: {} (#{}, created {})",
        latest.name, latest.id, latest.created_at
    );

    if cfg.dry_run {
        info!("🧪 Dry-run enabled: nothing downloaded or copied.");
        return Ok(FlashReport {
            artifact: latest,
            written: Vec::new(),
            archive_bytes: 0,
            dry_run: true,
        });
    }

    let archive = ScratchFile::new(cfg.work_dir.join(ARCHIVE_FILE_NAME));
    let archive_bytes = {
        let file = File::create(archive.path())
            .with_context(|| format!("Failed to create {}", archive.path().display()))?;
        let mut writer = BufWriter::new(file);
        let bytes = source.download_artifact(&latest, &mut writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", archive.path().display()))?;
        bytes
    };

    let payload = ScratchFile::new(cfg.work_dir.join(PAYLOAD_FILE_NAME));
    extract::extract_payload(archive.path(), &cfg.work_dir, PAYLOAD_FILE_NAME)?;
    drop(archive);

    let written = distribute::copy_to_targets(payload.path(), &targets.paths())?;

    info!("✅ Flashed {} to both halves", latest.name);
    Ok(FlashReport {
        artifact: latest,
        written,
        archive_bytes,
        dry_run: false,
    })
}
