//! The encoder seam.
//!
//! [`Converter`] is the capability the request pipeline depends on;
//! [`CwebpConverter`] implements it by running `cwebp` as a subprocess.
//! Tests substitute their own implementations.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use wp_core::config::EncoderConfig;
use wp_core::{Error, Result};

use crate::command::ToolCommand;
use crate::locate::EncoderLocator;
use crate::pipeline::Quality;

/// One encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub quality: Quality,
}

/// Produces a WebP file at `request.destination`.
///
/// Implementations return `Ok(())` only once the destination has been
/// written; every lower-level failure is wrapped into [`wp_core::Error`].
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, request: &ConversionRequest) -> Result<()>;
}

/// Runs `cwebp -q <quality> <source> -o <destination>`.
#[derive(Debug, Clone)]
pub struct CwebpConverter {
    locator: EncoderLocator,
    timeout: Duration,
}

impl CwebpConverter {
    pub fn new(locator: EncoderLocator, timeout: Duration) -> Self {
        Self { locator, timeout }
    }

    pub fn from_config(config: &EncoderConfig) -> Self {
        Self::new(EncoderLocator::from_config(config), config.timeout())
    }

    pub fn locator(&self) -> &EncoderLocator {
        &self.locator
    }
}

#[async_trait]
impl Converter for CwebpConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<()> {
        let location = self.locator.resolve()?;

        tracing::info!(
            encoder = %location.path.display(),
            source = %request.source.display(),
            quality = %request.quality,
            "converting to webp"
        );

        let output = ToolCommand::new(location.path)
            .arg("-q")
            .arg(request.quality.to_string())
            .arg(&request.source)
            .arg("-o")
            .arg(&request.destination)
            .timeout(self.timeout)
            .execute()
            .await?;

        if !request.destination.is_file() {
            return Err(Error::encoder(
                "encoder exited successfully but wrote no output",
                output.combined(),
            ));
        }

        tracing::debug!(output = %output.combined().trim(), "encoder finished");
        Ok(())
    }
}
