//! Unified error type for the conversion service.
//!
//! Every failure inside a request is funnelled into [`Error`], which knows its
//! HTTP status ([`Error::http_status`]), the short message shown to clients
//! ([`Error::summary`]) and, for encoder failures only, the captured process
//! output ([`Error::details`]).

use std::time::Duration;

/// Failure modes of a single conversion request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The multipart form carried no (or an empty) `image` field.
    #[error("No image file provided")]
    InputMissing,

    /// The request was malformed (bad multipart body, invalid quality).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request body exceeded the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A filesystem resource (work area, staged upload) could not be
    /// acquired.
    #[error("{context}: {source}")]
    ResourceUnavailable {
        /// Public summary of the failed step.
        context: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The encoder executable could not be located.
    #[error("Encoder not available: {0}")]
    ConfigurationUnresolved(String),

    /// The encoder failed to start or exited unsuccessfully.
    #[error("Encoder failed: {message}")]
    EncoderFailed {
        /// What went wrong (spawn error, exit status).
        message: String,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// The encoder ran past its deadline and was killed.
    #[error("Encoder timed out after {0:?}")]
    EncoderTimeout(Duration),

    /// The encoder reported success but its output could not be read.
    #[error("Failed to read converted file: {source}")]
    OutputUnreadable {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InputMissing | Error::InvalidInput(_) => 400,
            Error::PayloadTooLarge(_) => 413,
            Error::EncoderTimeout(_) => 504,
            Error::ResourceUnavailable { .. }
            | Error::ConfigurationUnresolved(_)
            | Error::EncoderFailed { .. }
            | Error::OutputUnreadable { .. }
            | Error::Internal(_) => 500,
        }
    }

    /// The message exposed in the `error` field of the JSON body.
    ///
    /// I/O failures expose a fixed summary only; the underlying error stays in
    /// the logs.
    pub fn summary(&self) -> String {
        match self {
            Error::InputMissing => "No image file provided".into(),
            Error::InvalidInput(msg) => msg.clone(),
            Error::PayloadTooLarge(_) => "Uploaded file is too large".into(),
            Error::ResourceUnavailable { context, .. } => (*context).into(),
            Error::ConfigurationUnresolved(msg) => msg.clone(),
            Error::EncoderFailed { .. } => "Failed to convert image".into(),
            Error::EncoderTimeout(_) => "Image conversion timed out".into(),
            Error::OutputUnreadable { .. } => "Failed to read converted file".into(),
            Error::Internal(_) => "Internal server error".into(),
        }
    }

    /// Diagnostic text exposed in the `details` field, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            Error::EncoderFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Convenience constructor for [`Error::ResourceUnavailable`].
    pub fn resource(context: &'static str, source: std::io::Error) -> Self {
        Error::ResourceUnavailable { context, source }
    }

    /// Convenience constructor for [`Error::EncoderFailed`].
    pub fn encoder(message: impl Into<String>, output: impl Into<String>) -> Self {
        Error::EncoderFailed {
            message: message.into(),
            output: output.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
