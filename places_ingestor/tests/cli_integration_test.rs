mod common;

use std::path::Path;

use common::{CannedResponse, CannedServer};
use tokio::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_places-ingestor");
const HEADER: &str = "provider_id,rating,reviews_count,rating_source,places_id,fetched_at";

fn write_providers(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("providers.csv");
    std::fs::write(
        &path,
        "provider_id,display_name,category,website,phone\n\
         a1,Alpha Physio,Rehab,,\n\
         b2,Beta Nutrition,Nutrition,,\n",
    )
    .unwrap();
    path
}

#[tokio::test]
async fn missing_api_key_exits_nonzero_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let providers = write_providers(dir.path());
    let out_dir = dir.path().join("out");

    let output = Command::new(BIN)
        .env_remove("GOOGLE_MAPS_API_KEY")
        .args(["fetch", "--run-date", "2025-01-02", "--providers"])
        .arg(&providers)
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GOOGLE_MAPS_API_KEY"), "{stderr}");
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn failed_and_empty_lookups_still_exit_zero() {
    let server = CannedServer::start(vec![
        CannedResponse::json(500, r#"{"error": {"code": 500}}"#),
        CannedResponse::json(200, "{}"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let providers = write_providers(dir.path());
    let out_dir = dir.path().join("out");
    let config = dir.path().join("ingestor.toml");
    std::fs::write(
        &config,
        format!("[places]\nendpoint = \"{}\"\ntimeout_secs = 5\n", server.url),
    )
    .unwrap();

    let output = Command::new(BIN)
        .env("GOOGLE_MAPS_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .args(["fetch", "--run-date", "2025-01-02", "--providers"])
        .arg(&providers)
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .await
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let artifact = out_dir.join("2025-01-02").join("ratings.csv");
    let text = std::fs::read_to_string(&artifact).unwrap();
    assert_eq!(text.trim_end(), HEADER);
    assert_eq!(server.captured().len(), 2);
}
