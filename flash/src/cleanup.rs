//! Scoped removal of the temporary files a run creates.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// RAII guard that removes a scratch file when dropped.
///
/// Removal is best-effort: failures are logged and never propagated.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed {}", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                log::warn!(
                    "scratch guard failed to remove {}: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}
