//! End-to-end conversions through the real subprocess path, with shell
//! scripts standing in for `cwebp`.

#![cfg(unix)]

mod common;

use common::{image_form, install_fake_cwebp, TestHarness};
use tempfile::tempdir;
use wp_core::config::Config;

/// Checks its argv, then writes a RIFF-prefixed copy of the input.
const ECHO_ENCODER: &str = r#"
[ "$1" = "-version" ] && { echo "1.4.0"; exit 0; }
[ "$1" = "-q" ] || { echo "unexpected argv: $*" >&2; exit 2; }
[ "$4" = "-o" ] || { echo "unexpected argv: $*" >&2; exit 2; }
printf 'RIFF' > "$5"
cat "$3" >> "$5"
"#;

fn config_for(install: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.encoder.install_path = Some(install.to_path_buf());
    config
}

#[tokio::test]
async fn test_cwebp_conversion_round_trip() {
    let libwebp = tempdir().unwrap();
    let root = install_fake_cwebp(libwebp.path(), ECHO_ENCODER);
    let (harness, addr) = TestHarness::with_cwebp(config_for(&root)).serve().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/convert?quality=55"))
        .multipart(image_form("cat.png", b"png-bytes"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/webp");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=cat.webp"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"RIFFpng-bytes");
    assert!(harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_cwebp_failure_is_reported_with_output() {
    let libwebp = tempdir().unwrap();
    let root = install_fake_cwebp(
        libwebp.path(),
        "echo 'Saving file'\necho 'Unsupported color conversion request' >&2\nexit 255",
    );
    let (harness, addr) = TestHarness::with_cwebp(config_for(&root)).serve().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/convert"))
        .multipart(image_form("bad.tiff", b"tiff"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to convert image");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("Saving file"));
    assert!(details.contains("Unsupported color conversion request"));
    assert!(
        details.find("Saving file").unwrap()
            < details.find("Unsupported color conversion request").unwrap()
    );
    assert!(harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_cwebp_timeout_is_gateway_timeout() {
    let libwebp = tempdir().unwrap();
    let root = install_fake_cwebp(libwebp.path(), "sleep 10");
    let mut config = config_for(&root);
    config.encoder.timeout_secs = 1;
    let (harness, addr) = TestHarness::with_cwebp(config).serve().await;

    let started = std::time::Instant::now();
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/convert"))
        .multipart(image_form("slow.png", b"png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 504);
    assert!(started.elapsed() < std::time::Duration::from_secs(8));
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Image conversion timed out");
    assert!(harness.leftovers().is_empty());
}

#[tokio::test]
async fn test_debug_reports_installed_encoder() {
    let libwebp = tempdir().unwrap();
    let root = install_fake_cwebp(libwebp.path(), ECHO_ENCODER);
    let mut config = config_for(&root);
    config.server.debug_endpoint = true;
    let (_harness, addr) = TestHarness::with_cwebp(config).serve().await;

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/debug"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["exists"], true);
    assert_eq!(body["version"], "1.4.0");
    assert_eq!(body["installContents"], serde_json::json!(["bin"]));
    assert_eq!(body["binContents"], serde_json::json!(["cwebp"]));
}
