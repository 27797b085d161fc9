//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppContext`] around an
//! isolated work directory and a [`FakeConverter`]. The [`with_server`]
//! constructors start Axum on a random port for HTTP-level testing.
//!
//! [`with_server`]: TestHarness::with_server

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use wp_core::config::Config;
use wp_core::{Error, Result};
use wp_encoder::{ConversionRequest, Converter, Quality};
use wp_server::context::AppContext;
use wp_server::router::build_router;

/// Bytes the fake converter writes in front of the input.
pub const FAKE_WEBP_MAGIC: &[u8] = b"RIFF";

/// Converter that "encodes" by prefixing the input with [`FAKE_WEBP_MAGIC`]
/// and records every request it sees.
#[derive(Default)]
pub struct FakeConverter {
    failure: Option<String>,
    requests: Mutex<Vec<ConversionRequest>>,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter that always fails with `output` as the captured encoder
    /// output.
    pub fn failing(output: &str) -> Self {
        Self {
            failure: Some(output.to_string()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ConversionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn qualities(&self) -> Vec<Quality> {
        self.requests().into_iter().map(|r| r.quality).collect()
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(ref output) = self.failure {
            return Err(Error::encoder("exit status: 1", output.clone()));
        }

        let input = tokio::fs::read(&request.source)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        let mut webp = FAKE_WEBP_MAGIC.to_vec();
        webp.extend_from_slice(&input);
        tokio::fs::write(&request.destination, webp)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] whose work areas
/// live under a private temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub converter: Arc<FakeConverter>,
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and a succeeding
    /// fake converter.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self::with_fake(config, FakeConverter::new())
    }

    /// Create a new harness around the given fake converter.
    pub fn with_fake(config: Config, converter: FakeConverter) -> Self {
        let work_dir = TempDir::new().expect("failed to create work dir");
        let converter = Arc::new(converter);
        let ctx = AppContext::with_converter(
            with_work_dir(config, work_dir.path()),
            converter.clone(),
        );
        Self {
            ctx,
            converter,
            work_dir,
        }
    }

    /// Create a harness that converts with the real `cwebp` converter, as
    /// configured by `config`.
    pub fn with_cwebp(config: Config) -> Self {
        let work_dir = TempDir::new().expect("failed to create work dir");
        let ctx = AppContext::new(with_work_dir(config, work_dir.path()));
        Self {
            ctx,
            converter: Arc::new(FakeConverter::new()),
            work_dir,
        }
    }

    /// Start an Axum server with default config on a random port.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        Self::with_config(config).serve().await
    }

    /// Start an Axum server for this harness on a random port and return it
    /// together with the bound socket address.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Entries left behind in the work directory.
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.work_dir.path())
            .expect("failed to read work dir")
            .map(|entry| entry.expect("failed to read entry").path())
            .collect()
    }
}

fn with_work_dir(mut config: Config, work_dir: &Path) -> Config {
    config.encoder.work_dir = Some(work_dir.to_path_buf());
    config
}

/// Build the multipart form `POST /convert` expects.
pub fn image_form(filename: &str, bytes: &[u8]) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(filename.to_string());
    reqwest::multipart::Form::new().part("image", part)
}

/// Install a shell script as `<root>/bin/cwebp` and return `root`.
#[cfg(unix)]
pub fn install_fake_cwebp(root: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = root.join("bin");
    std::fs::create_dir_all(&bin).expect("failed to create bin dir");
    let path = bin.join("cwebp");
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to chmod script");
    root.to_path_buf()
}
