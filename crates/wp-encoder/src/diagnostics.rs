//! Encoder introspection for operators.
//!
//! [`EncoderReport::collect`] gathers where the encoder is expected, whether
//! it exists, what version it reports, and what the configured install tree
//! contains. Nothing here is needed for conversions themselves.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::command::ToolCommand;
use crate::locate::{EncoderLocator, LocationOrigin};

/// Upper bound for the `-version` probe.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Snapshot of the encoder installation.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncoderReport {
    /// Path that conversions would execute (bare command for `PATH` lookups).
    pub encoder_path: String,
    /// Whether the encoder resolved to an executable.
    pub exists: bool,
    /// Absolute path of the resolved executable.
    pub resolved: Option<String>,
    /// How the encoder was found.
    pub origin: Option<LocationOrigin>,
    /// Why resolution failed.
    pub resolution_error: Option<String>,
    /// Size and permissions of the executable.
    pub file_info: Option<String>,
    /// First line of `<encoder> -version`, or the failure.
    pub version: Option<String>,
    /// Entries of the configured install tree.
    pub install_contents: Option<Vec<String>>,
    /// Entries of the install tree's `bin` directory.
    pub bin_contents: Option<Vec<String>>,
}

impl EncoderReport {
    pub async fn collect(locator: &EncoderLocator) -> Self {
        let encoder_path = match locator.candidate() {
            Ok(path) => path.display().to_string(),
            Err(e) => e.summary(),
        };

        let (resolved, origin, resolution_error) = match locator.resolve() {
            Ok(location) => (Some(location.path), Some(location.origin), None),
            Err(e) => (None, None, Some(e.summary())),
        };

        let file_info = resolved.as_deref().and_then(describe_file);
        let version = match resolved {
            Some(ref path) => Some(detect_version(path).await),
            None => None,
        };

        let (install_contents, bin_contents) = match locator.install_root() {
            Some(Ok(root)) => (
                Some(list_dir(&root)),
                Some(list_dir(&root.join("bin"))),
            ),
            Some(Err(e)) => (Some(vec![e.summary()]), None),
            None => (None, None),
        };

        Self {
            encoder_path,
            exists: resolved.is_some(),
            resolved: resolved.map(|p| p.display().to_string()),
            origin,
            resolution_error,
            file_info,
            version,
            install_contents,
            bin_contents,
        }
    }
}

/// Run `<encoder> -version` and return the first line of its output.
async fn detect_version(path: &Path) -> String {
    let result = ToolCommand::new(path.to_path_buf())
        .arg("-version")
        .timeout(VERSION_TIMEOUT)
        .execute()
        .await;

    match result {
        Ok(output) => output
            .combined()
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string(),
        Err(e) => format!("error: {e}"),
    }
}

fn describe_file(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        format!("{:o}", meta.permissions().mode() & 0o7777)
    };
    #[cfg(not(unix))]
    let mode = if meta.permissions().readonly() { "ro" } else { "rw" }.to_string();
    Some(format!("size={} mode={mode}", meta.len()))
}

fn list_dir(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
            names.sort();
            names
        }
        Err(e) => vec![format!("error reading dir: {e}")],
    }
}
