//! Device presence checks run before anything touches the network.

use crate::errors::{FlashError, MissingDevice};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Volume label the left half mounts as in bootloader mode.
pub const LEFT_VOLUME: &str = "GLV80LHBOOT";
/// Volume label the right half mounts as in bootloader mode.
pub const RIGHT_VOLUME: &str = "GLV80RHBOOT";

/// Resolved mount paths for both keyboard halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTargets {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl MountTargets {
    pub fn under(mount_dir: &Path) -> Self {
        Self {
            left: mount_dir.join(LEFT_VOLUME),
            right: mount_dir.join(RIGHT_VOLUME),
        }
    }

    /// Targets in flashing order (left first).
    pub fn paths(&self) -> [&Path; 2] {
        [&self.left, &self.right]
    }
}

/// Verify both halves are mounted under `mount_dir`.
///
/// Both paths are checked before failing so the error names every half that
/// is missing.
pub fn check_mounts(mount_dir: &Path) -> Result<MountTargets, FlashError> {
    info!("🔍 Checking for mounted halves under {}", mount_dir.display());

    let targets = MountTargets::under(mount_dir);
    let mut missing = Vec::new();

    for (label, path) in [("Left half", &targets.left), ("Right half", &targets.right)] {
        let present = path.try_exists().map_err(|source| FlashError::Inspect {
            path: path.clone(),
            source,
        })?;
        if present {
            debug!("{} found at {}", label, path.display());
        } else {
            missing.push(MissingDevice {
                label,
                path: path.clone(),
            });
        }
    }

    if !missing.is_empty() {
        return Err(FlashError::DevicesNotMounted(missing));
    }

    info!("✅ Both halves are connected");
    Ok(targets)
}
