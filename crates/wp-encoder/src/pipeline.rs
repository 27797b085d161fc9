//! The conversion pipeline for a single upload.
//!
//! [`convert_upload`] stages the upload inside a fresh [`Workspace`], hands a
//! [`ConversionRequest`] to the [`Converter`] and reads the produced file
//! back. The workspace is dropped before the function returns, whatever the
//! outcome.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use wp_core::{Error, Result};

use crate::converter::{ConversionRequest, Converter};
use crate::workspace::{webp_filename, Workspace};

/// Quality used when neither the request nor the configuration sets one.
pub const DEFAULT_QUALITY: u8 = 80;

/// Encoder quality level in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(invalid_quality());
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

impl FromStr for Quality {
    type Err = Error;

    /// Plain decimal digits only (no sign).
    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_quality());
        }
        let value: u8 = digits.parse().map_err(|_| invalid_quality())?;
        Self::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn invalid_quality() -> Error {
    Error::InvalidInput("quality must be an integer between 0 and 100".into())
}

/// An image received from a client.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Filename as sent by the client.
    pub filename: String,
    pub bytes: Bytes,
}

/// The WebP produced for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    /// Upload filename with its extension replaced by `.webp`.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Convert one upload to WebP.
///
/// `work_root` selects where the temporary work area is created (system temp
/// directory when `None`).
pub async fn convert_upload(
    converter: &dyn Converter,
    work_root: Option<&Path>,
    upload: UploadedImage,
    quality: Quality,
) -> Result<ConvertedImage> {
    if upload.bytes.is_empty() {
        return Err(Error::InputMissing);
    }

    let workspace = Workspace::new(work_root).await?;
    let source = workspace.input_path(&upload.filename);
    let destination = workspace.output_path(&upload.filename);

    tokio::fs::write(&source, &upload.bytes)
        .await
        .map_err(|e| Error::resource("Failed to save uploaded file", e))?;

    tracing::debug!(
        source = %source.display(),
        size = upload.bytes.len(),
        "staged upload"
    );

    let request = ConversionRequest {
        source,
        destination,
        quality,
    };
    converter.convert(&request).await?;

    let bytes = tokio::fs::read(&request.destination)
        .await
        .map_err(|source| Error::OutputUnreadable { source })?;

    Ok(ConvertedImage {
        filename: webp_filename(&upload.filename),
        bytes,
    })
}
