use crate::errors::{FlashError, Result};
use anyhow::Context;
use log::{debug, info};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extract the entry named `payload_name` from the ZIP at `archive_path` into
/// `dest_dir`, creating parent directories as needed.
///
/// Other entries are left in the archive. Returns the path written.
pub fn extract_payload(archive_path: &Path, dest_dir: &Path, payload_name: &str) -> Result<PathBuf> {
    info!(
        "📦 Extracting {} from {}",
        payload_name,
        archive_path.display()
    );

    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid ZIP archive", archive_path.display()))?;

    let expected = Path::new(payload_name);
    let mut skipped = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let enclosed = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("Skipping unsafe entry {}", entry.name());
                skipped.push(entry.name().to_string());
                continue;
            }
        };

        if entry.is_dir() || enclosed != expected {
            debug!("Skipping entry {}", entry.name());
            skipped.push(entry.name().to_string());
            continue;
        }

        let outpath = dest_dir.join(&enclosed);
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut outfile = File::create(&outpath)
            .with_context(|| format!("Failed to create {}", outpath.display()))?;
        let written = io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract {}", outpath.display()))?;

        info!("✅ Extracted {} ({} bytes)", outpath.display(), written);
        return Ok(outpath);
    }

    Err(FlashError::PayloadNotFound {
        archive: archive_path.to_path_buf(),
        expected: payload_name.to_string(),
        entries: skipped,
    }
    .into())
}
