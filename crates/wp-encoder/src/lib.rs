//! # wp-encoder
//!
//! Everything between an uploaded image and the external WebP encoder.
//!
//! This crate provides:
//!
//! - **Encoder location** ([`EncoderLocator`]) -- resolve `cwebp` from an
//!   install tree override or the `PATH`.
//! - **Command execution** ([`ToolCommand`]) -- async builder with a hard
//!   timeout and captured output.
//! - **Work areas** ([`Workspace`]) -- per-request temporary directories that
//!   disappear on drop.
//! - **The converter seam** ([`Converter`], [`CwebpConverter`]).
//! - **The request pipeline** ([`convert_upload`]).
//! - **Diagnostics** ([`EncoderReport`]) for the debug endpoint and CLI.

pub mod command;
pub mod converter;
pub mod diagnostics;
pub mod locate;
pub mod pipeline;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use converter::{ConversionRequest, Converter, CwebpConverter};
pub use diagnostics::EncoderReport;
pub use locate::{EncoderLocation, EncoderLocator, LocationOrigin};
pub use pipeline::{convert_upload, ConvertedImage, Quality, UploadedImage};
pub use workspace::{sanitize_filename, webp_filename, Workspace};
