use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flash operations
pub type Result<T> = anyhow::Result<T>;

/// One keyboard half that was expected but not found under the mount directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDevice {
    pub label: &'static str,
    pub path: PathBuf,
}

impl fmt::Display for MissingDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} not connected in bootloader mass storage device mode ({} not found)",
            self.label,
            self.path.display()
        )
    }
}

#[derive(Error, Debug)]
pub enum FlashError {
    #[error("Missing required environment variable(s): {}", .names.join(", "))]
    MissingEnv { names: Vec<&'static str> },

    #[error("{}", join_lines(.0))]
    DevicesNotMounted(Vec<MissingDevice>),

    #[error("Unable to inspect {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No artifacts to flash")]
    NoArtifacts,

    #[error("Latest artifact {name} (#{id}) has expired")]
    ArtifactExpired { id: u64, name: String },

    #[error("Archive {archive} does not contain {expected} (entries: {})", list_or_empty(.entries))]
    PayloadNotFound {
        archive: PathBuf,
        expected: String,
        entries: Vec<String>,
    },

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },
}

fn join_lines(missing: &[MissingDevice]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn list_or_empty(entries: &[String]) -> String {
    if entries.is_empty() {
        "none".to_string()
    } else {
        entries.join(", ")
    }
}
