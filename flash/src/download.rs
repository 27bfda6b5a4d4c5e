use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Binary-unit size for progress output, e.g. `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// GET `url` with `client` and stream the body into `dest`.
pub fn download_with_progress(
    client: &Client,
    url: &str,
    dest: &mut dyn Write,
    description: &str,
) -> Result<u64> {
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()
        .with_context(|| format!("Failed to download from {}", url))?;

    write_response(response, dest, description)
}

/// Stream an already-successful response body into `dest`.
pub fn write_response(response: Response, dest: &mut dyn Write, description: &str) -> Result<u64> {
    let total_size = response.content_length();
    copy_with_progress(response, total_size, dest, description)
}

/// Copy `reader` into `dest`, drawing a progress line on stderr.
pub fn copy_with_progress(
    mut reader: impl Read,
    total_size: Option<u64>,
    dest: &mut dyn Write,
    description: &str,
) -> Result<u64> {
    const REDRAW_EVERY: Duration = Duration::from_millis(250);

    let mut received: u64 = 0;
    let mut chunk = [0u8; 8192];
    let started = Instant::now();
    let mut last_draw = started;

    match total_size {
        Some(total) => eprintln!("⬇️  {} [{}]", description, format_bytes(total)),
        None => eprintln!("⬇️  {} [size unknown]", description),
    }

    loop {
        let n = reader
            .read(&mut chunk)
            .with_context(|| format!("{} stopped after {} bytes", description, received))?;
        if n == 0 {
            break;
        }
        dest.write_all(&chunk[..n])?;
        received += n as u64;

        if last_draw.elapsed() >= REDRAW_EVERY {
            draw_progress(received, total_size, started);
            last_draw = Instant::now();
        }
    }
    dest.flush()?;

    let secs = started.elapsed().as_secs_f64();
    eprintln!(
        "\r   ✅ {} received in {:.1}s at {}/s{:20}",
        format_bytes(received),
        secs,
        format_bytes(rate(received, secs) as u64),
        ""
    );

    Ok(received)
}

fn rate(bytes: u64, secs: f64) -> f64 {
    if secs > 0.0 {
        bytes as f64 / secs
    } else {
        0.0
    }
}

fn draw_progress(received: u64, total_size: Option<u64>, started: Instant) {
    const WIDTH: usize = 30;
    let speed = rate(received, started.elapsed().as_secs_f64());

    match total_size.filter(|t| *t > 0) {
        Some(total) => {
            let fraction = (received as f64 / total as f64).min(1.0);
            let remaining = if speed > 0.0 {
                total.saturating_sub(received) as f64 / speed
            } else {
                0.0
            };
            let filled = (fraction * WIDTH as f64) as usize;
            eprint!(
                "\r   {}{} {:>5.1}%  {} of {}  {}/s  ~{}s left ",
                "=".repeat(filled),
                " ".repeat(WIDTH - filled),
                fraction * 100.0,
                format_bytes(received),
                format_bytes(total),
                format_bytes(speed as u64),
                remaining as u64
            );
        }
        None => eprint!(
            "\r   {} so far  {}/s ",
            format_bytes(received),
            format_bytes(speed as u64)
        ),
    }
    io::stderr().flush().ok();
}
