//! CLI argument parsing for flash

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flash")]
#[command(version, about = "⌨️ Flash the latest Glove80 firmware build onto both halves")]
#[command(long_about = "⌨️ Flash the latest Glove80 firmware build onto both halves\n\n\
    Downloads the newest GitHub Actions artifact for $OWNER/$REPO (authenticated with\n\
    $GITHUB_PAT), extracts glove80.uf2 and copies it to GLV80LHBOOT and GLV80RHBOOT.\n\
    Put both halves in bootloader mode first.")]
pub struct Cli {
    /// Directory the two bootloader volumes mount under
    #[arg(short = 'd', long, default_value = "/Volumes")]
    pub directory: PathBuf,

    /// Check devices and resolve the artifact without downloading or copying
    #[arg(long)]
    pub dry_run: bool,

    /// Log debug details
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
