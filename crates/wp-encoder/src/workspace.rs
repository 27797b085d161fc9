//! Per-request work areas.
//!
//! A [`Workspace`] is a uniquely named temporary directory holding the staged
//! upload and the encoder output. It is removed when dropped, on every exit
//! path of the request.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wp_core::{Error, Result};

/// Prefix of every work area directory name.
pub const WORKSPACE_PREFIX: &str = "webp-convert-";

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

/// Scoped work area for one conversion.
///
/// # Example
///
/// ```no_run
/// use wp_encoder::Workspace;
///
/// # async fn example() {
/// let workspace = Workspace::new(None).await.unwrap();
/// let input = workspace.input_path("photo.JPG");
/// let output = workspace.output_path("photo.JPG");
/// // ... stage `input`, run the encoder into `output` ...
/// drop(workspace); // directory and contents are gone
/// # }
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a work area under `root`, or under the system temp directory
    /// when `root` is `None`.
    pub async fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let temp_dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::resource("Failed to create temp directory", e))?;

        for sub in [INPUT_DIR, OUTPUT_DIR] {
            tokio::fs::create_dir(temp_dir.path().join(sub))
                .await
                .map_err(|e| Error::resource("Failed to create temp directory", e))?;
        }

        tracing::trace!(path = %temp_dir.path().display(), "created workspace");
        Ok(Self { temp_dir })
    }

    /// Path to the work area directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the upload named `original` is staged.
    pub fn input_path(&self, original: &str) -> PathBuf {
        self.temp_dir
            .path()
            .join(INPUT_DIR)
            .join(sanitize_filename(original))
    }

    /// Where the encoder writes the WebP copy of `original`.
    pub fn output_path(&self, original: &str) -> PathBuf {
        self.temp_dir
            .path()
            .join(OUTPUT_DIR)
            .join(webp_filename(original))
    }
}

/// Reduce a client-supplied filename to its final path component.
///
/// Both `/` and `\` count as separators. Empty results and the special names
/// `.` and `..` become `upload`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}

/// Replace the final extension of `name` with `.webp`.
///
/// `photo.JPG` → `photo.webp`, `archive.tar.gz` → `archive.tar.webp`,
/// `noext` → `noext.webp`. A leading dot does not start an extension, so
/// `.hidden` → `.hidden.webp`.
pub fn webp_filename(name: &str) -> String {
    let base = sanitize_filename(name);
    let stem = match base.rfind('.') {
        Some(0) | None => base.as_str(),
        Some(idx) => &base[..idx],
    };
    format!("{stem}.webp")
}
