//! Application configuration types.
//!
//! The top-level [`Config`] is deserialized from JSON. Every section defaults
//! sensibly so an empty `{}` file is valid; command-line flags and
//! environment variables are layered on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub encoder: EncoderConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::InvalidInput(format!("config parse error: {e}")))
    }

    /// Read and parse a config file, failing on any error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::resource("Failed to read config file", e))?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, missing, or unparsable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.max_upload_bytes == Some(0) {
            warnings.push("server.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if self.encoder.default_quality > 100 {
            warnings.push(format!(
                "encoder.default_quality {} is outside 0..=100; 80 will be used",
                self.encoder.default_quality
            ));
        }

        if self.encoder.timeout_secs == 0 {
            warnings.push("encoder.timeout_secs is 0; every conversion will time out".into());
        }

        if let Some(ref dir) = self.encoder.work_dir {
            if !dir.is_dir() {
                warnings.push(format!(
                    "encoder.work_dir {} does not exist or is not a directory",
                    dir.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes. Unlimited when unset.
    pub max_upload_bytes: Option<usize>,
    /// Route `GET /debug` (encoder introspection).
    pub debug_endpoint: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            max_upload_bytes: None,
            debug_endpoint: false,
        }
    }
}

/// External encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Root of a libwebp install tree. Relative paths are resolved against the
    /// working directory. When unset, [`EncoderConfig::command`] is looked up
    /// on `PATH`.
    pub install_path: Option<PathBuf>,
    /// Location of the encoder inside the install tree.
    pub binary_subpath: PathBuf,
    /// Command used when no install path is configured.
    pub command: PathBuf,
    /// Quality used when the request does not supply one.
    pub default_quality: u8,
    /// Maximum encoder run time before the process is killed.
    pub timeout_secs: u64,
    /// Parent directory for per-request work areas (system temp dir when
    /// unset).
    pub work_dir: Option<PathBuf>,
}

impl EncoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            install_path: None,
            binary_subpath: PathBuf::from("bin/cwebp"),
            command: PathBuf::from("cwebp"),
            default_quality: 80,
            timeout_secs: 60,
            work_dir: None,
        }
    }
}
