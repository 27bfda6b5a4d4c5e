use crate::errors::Result;
use anyhow::{anyhow, Context};
use log::info;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Copy `payload` into each of `targets` in order, returning the files written.
///
/// Stops at the first failure; later targets are not attempted.
pub fn copy_to_targets(payload: &Path, targets: &[&Path]) -> Result<Vec<PathBuf>> {
    let file_name = payload
        .file_name()
        .ok_or_else(|| anyhow!("Payload path {} has no file name", payload.display()))?;

    let mut written = Vec::with_capacity(targets.len());
    for target in targets {
        let dest = target.join(file_name);
        info!("💾 Copying {} -> {}", payload.display(), dest.display());
        let bytes = copy_file(payload, &dest)?;
        info!("✅ Wrote {} bytes to {}", bytes, dest.display());
        written.push(dest);
    }
    Ok(written)
}

/// Byte-for-byte copy, synced to disk before returning.
///
/// The bootloader reboots the half as soon as it sees a complete image, so the
/// data must hit the device before we report success.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    let mut reader =
        File::open(from).with_context(|| format!("Failed to open {}", from.display()))?;
    let mut writer =
        File::create(to).with_context(|| format!("Failed to create {}", to.display()))?;
    let bytes = io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    writer
        .sync_all()
        .with_context(|| format!("Failed to sync {}", to.display()))?;
    Ok(bytes)
}
