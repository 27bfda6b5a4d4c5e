use env_logger::Target;
use log::LevelFilter;
use std::fs;
use std::io;
use std::path::Path;

/// Initialise `env_logger`. `RUST_LOG` still wins over the default level.
///
/// With `log_file`, logs are appended there; if the file cannot be opened we
/// fall back to stderr.
pub fn init(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(target_for(log_file))
        .format_timestamp(None)
        .try_init();
}

fn target_for(log_file: Option<&Path>) -> Target {
    match log_file.map(open_append) {
        Some(Ok(file)) => Target::Pipe(Box::new(file)),
        Some(Err(err)) => {
            eprintln!("⚠️ Cannot open log file, logging to stderr: {}", err);
            Target::Stderr
        }
        None => Target::Stderr,
    }
}

fn open_append(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}
