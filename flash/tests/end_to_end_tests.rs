use flash::config::FlashConfig;
use flash::errors::FlashError;
use flash::github::GithubClient;
use flash::pipeline::{self, ARCHIVE_FILE_NAME, PAYLOAD_FILE_NAME};
use flash::preflight::{LEFT_VOLUME, RIGHT_VOLUME};
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

const LIST_PATH: &str = "/repos/andrewjleung/zmk-config/actions/artifacts";

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut writer = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer
}

struct Workspace {
    _root: TempDir,
    mounts: PathBuf,
    work: PathBuf,
}

fn workspace() -> Workspace {
    let root = tempdir().unwrap();
    let mounts = root.path().join("Volumes");
    let work = root.path().join("work");
    fs::create_dir_all(mounts.join(LEFT_VOLUME)).unwrap();
    fs::create_dir_all(mounts.join(RIGHT_VOLUME)).unwrap();
    fs::create_dir_all(&work).unwrap();
    Workspace {
        _root: root,
        mounts,
        work,
    }
}

fn mock_github(server: &MockServer, artifacts: serde_json::Value, zip: Vec<u8>) {
    let blob_url = server.url("/blobs/latest.zip");
    server.mock(|when, then| {
        when.method(GET)
            .path(LIST_PATH)
            .header("authorization", "Bearer ghp_test");
        then.status(200).json_body(artifacts);
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/42/zip", LIST_PATH));
        then.status(302).header("location", blob_url.as_str());
    });
    server.mock(|when, then| {
        when.method(GET).path("/blobs/latest.zip");
        then.status(200).body(zip);
    });
}

fn listing() -> serde_json::Value {
    json!({
        "total_count": 3,
        "artifacts": [
            { "id": 41, "name": "firmware", "size_in_bytes": 10, "expired": false,
              "created_at": "2024-05-01T08:00:00Z" },
            { "id": 42, "name": "firmware", "size_in_bytes": 10, "expired": false,
              "created_at": "2024-05-03T08:00:00Z" },
            { "id": 40, "name": "firmware", "size_in_bytes": 10, "expired": true,
              "created_at": "2024-04-01T08:00:00Z" }
        ]
    })
}

fn assert_empty(dir: &Path) {
    let leftovers: Vec<_> = fs::read_dir(dir).unwrap().collect();
    assert!(leftovers.is_empty(), "leftover files: {leftovers:?}");
}

#[test]
fn latest_artifact_lands_on_both_halves() {
    let server = MockServer::start();
    mock_github(&server, listing(), build_zip(&[(PAYLOAD_FILE_NAME, b"UF2 firmware")]));
    let ws = workspace();
    let client = GithubClient::new(&server.base_url(), "ghp_test", "andrewjleung", "zmk-config")
        .unwrap();
    let cfg = FlashConfig::new("andrewjleung", "zmk-config", ws.mounts.clone())
        .with_work_dir(ws.work.clone());

    let report = pipeline::run(&cfg, &client).unwrap();

    assert_eq!(report.artifact.id, 42);
    for volume in [LEFT_VOLUME, RIGHT_VOLUME] {
        let copied = ws.mounts.join(volume).join(PAYLOAD_FILE_NAME);
        assert_eq!(fs::read(copied).unwrap(), b"UF2 firmware");
    }
    assert!(!ws.work.join(ARCHIVE_FILE_NAME).exists());
    assert!(!ws.work.join(PAYLOAD_FILE_NAME).exists());
    assert_empty(&ws.work);
}

#[test]
fn expired_latest_artifact_is_never_downloaded() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(LIST_PATH);
        then.status(200).json_body(json!({
            "total_count": 1,
            "artifacts": [{ "id": 42, "name": "firmware", "expired": true,
                            "created_at": "2024-05-03T08:00:00Z" }]
        }));
    });
    let download = server.mock(|when, then| {
        when.method(GET).path(format!("{}/42/zip", LIST_PATH));
        then.status(410);
    });
    let ws = workspace();
    let client = GithubClient::new(&server.base_url(), "ghp_test", "andrewjleung", "zmk-config")
        .unwrap();
    let cfg = FlashConfig::new("andrewjleung", "zmk-config", ws.mounts.clone())
        .with_work_dir(ws.work.clone());

    let err = pipeline::run(&cfg, &client).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FlashError>(),
        Some(FlashError::ArtifactExpired { id: 42, .. })
    ));
    assert_eq!(download.hits(), 0);
    assert_empty(&ws.work);
}

#[test]
fn failed_blob_download_leaves_no_archive() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(LIST_PATH);
        then.status(200).json_body(listing());
    });
    let blob_url = server.url("/blobs/latest.zip");
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/42/zip", LIST_PATH));
        then.status(302).header("location", blob_url.as_str());
    });
    let blob = server.mock(|when, then| {
        when.method(GET).path("/blobs/latest.zip");
        then.status(500).body("storage unavailable");
    });
    let ws = workspace();
    let client = GithubClient::new(&server.base_url(), "ghp_test", "andrewjleung", "zmk-config")
        .unwrap();
    let cfg = FlashConfig::new("andrewjleung", "zmk-config", ws.mounts.clone())
        .with_work_dir(ws.work.clone());

    let err = pipeline::run(&cfg, &client).unwrap_err();

    blob.assert();
    assert!(format!("{err:#}").contains("Failed to download"), "{err:#}");
    assert!(!ws.work.join(ARCHIVE_FILE_NAME).exists());
    assert_empty(&ws.work);
    for volume in [LEFT_VOLUME, RIGHT_VOLUME] {
        assert!(!ws.mounts.join(volume).join(PAYLOAD_FILE_NAME).exists());
    }
}

#[test]
fn binary_flashes_end_to_end() {
    let server = MockServer::start();
    mock_github(&server, listing(), build_zip(&[(PAYLOAD_FILE_NAME, b"UF2 firmware")]));
    let ws = workspace();

    let output = Command::new(env!("CARGO_BIN_EXE_flash"))
        .current_dir(&ws.work)
        .args(["--directory", ws.mounts.to_str().unwrap()])
        .env("OWNER", "andrewjleung")
        .env("REPO", "zmk-config")
        .env("GITHUB_PAT", "ghp_test")
        .env("GITHUB_API_URL", server.base_url())
        .output()
        .expect("failed to run flash binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("Flashed firmware (#42)"), "stdout: {stdout}");
    assert!(stdout.contains("archive downloaded"), "stdout: {stdout}");
    for volume in [LEFT_VOLUME, RIGHT_VOLUME] {
        let copied = ws.mounts.join(volume).join(PAYLOAD_FILE_NAME);
        assert_eq!(fs::read(copied).unwrap(), b"UF2 firmware");
    }
    assert_empty(&ws.work);
}

#[test]
fn binary_dry_run_copies_nothing() {
    let server = MockServer::start();
    mock_github(&server, listing(), build_zip(&[(PAYLOAD_FILE_NAME, b"UF2 firmware")]));
    let ws = workspace();

    let output = Command::new(env!("CARGO_BIN_EXE_flash"))
        .current_dir(&ws.work)
        .args(["-d", ws.mounts.to_str().unwrap(), "--dry-run"])
        .env("OWNER", "andrewjleung")
        .env("REPO", "zmk-config")
        .env("GITHUB_PAT", "ghp_test")
        .env("GITHUB_API_URL", server.base_url())
        .output()
        .expect("failed to run flash binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Would flash firmware (#42"), "stdout: {stdout}");
    assert!(!ws.mounts.join(LEFT_VOLUME).join(PAYLOAD_FILE_NAME).exists());
    assert_empty(&ws.work);
}
