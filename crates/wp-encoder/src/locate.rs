//! Encoder location.
//!
//! [`EncoderLocator`] turns the encoder settings into a concrete executable
//! path. Resolution order:
//!
//! 1. an absolute install path, joined with the binary sub-path;
//! 2. a relative install path, resolved against the working directory and
//!    joined with the binary sub-path;
//! 3. the configured command (bare `cwebp` by default), looked up on `PATH`.
//!
//! The result must be an executable file; anything else is reported as
//! [`wp_core::Error::ConfigurationUnresolved`] so no conversion is attempted.

use std::path::{Path, PathBuf};

use serde::Serialize;
use wp_core::config::EncoderConfig;
use wp_core::{Error, Result};

/// Where a resolved encoder path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationOrigin {
    /// Derived from the configured install tree.
    InstallPath,
    /// Found by searching `PATH` for the configured command.
    SearchPath,
}

/// A resolved, executable encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderLocation {
    pub path: PathBuf,
    pub origin: LocationOrigin,
}

/// Immutable encoder lookup rules, built once from configuration.
#[derive(Debug, Clone)]
pub struct EncoderLocator {
    install_path: Option<PathBuf>,
    binary_subpath: PathBuf,
    command: PathBuf,
}

impl EncoderLocator {
    pub fn new(
        install_path: Option<PathBuf>,
        binary_subpath: impl Into<PathBuf>,
        command: impl Into<PathBuf>,
    ) -> Self {
        Self {
            install_path,
            binary_subpath: binary_subpath.into(),
            command: command.into(),
        }
    }

    pub fn from_config(config: &EncoderConfig) -> Self {
        Self::new(
            config.install_path.clone(),
            config.binary_subpath.clone(),
            config.command.clone(),
        )
    }

    /// The configured install tree, if any.
    pub fn install_path(&self) -> Option<&Path> {
        self.install_path.as_deref()
    }

    /// The install tree as an absolute path (relative paths are joined onto
    /// the working directory).
    pub fn install_root(&self) -> Option<Result<PathBuf>> {
        self.install_path.as_deref().map(absolutize)
    }

    /// The path that would be executed, before checking that it exists.
    ///
    /// For the `PATH` fallback this is the bare command.
    pub fn candidate(&self) -> Result<PathBuf> {
        match self.install_root() {
            Some(root) => Ok(root?.join(&self.binary_subpath)),
            None => Ok(self.command.clone()),
        }
    }

    /// Resolve the encoder to an executable path.
    pub fn resolve(&self) -> Result<EncoderLocation> {
        let candidate = self.candidate()?;
        let origin = if self.install_path.is_some() {
            LocationOrigin::InstallPath
        } else {
            LocationOrigin::SearchPath
        };

        let path = which::which(&candidate).map_err(|e| {
            let reason = match origin {
                LocationOrigin::InstallPath => {
                    format!("encoder binary not usable at {}: {e}", candidate.display())
                }
                LocationOrigin::SearchPath => {
                    format!("{} not found in PATH: {e}", candidate.display())
                }
            };
            Error::ConfigurationUnresolved(reason)
        })?;

        Ok(EncoderLocation { path, origin })
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| {
        Error::ConfigurationUnresolved(format!("failed to get working directory: {e}"))
    })?;
    Ok(cwd.join(path))
}
