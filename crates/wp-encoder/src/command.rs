//! Builder for executing the external encoder with a hard timeout.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

/// Default command timeout: 60 seconds.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Standard output followed by standard error.
    pub fn combined(&self) -> String {
        combine(&self.stdout, &self.stderr)
    }
}

fn combine(stdout: &str, stderr: &str) -> String {
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, _) => stderr.to_string(),
        (_, true) => stdout.to_string(),
        _ if stdout.ends_with('\n') => format!("{stdout}{stderr}"),
        _ => format!("{stdout}\n{stderr}"),
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use wp_encoder::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> wp_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("cwebp"))
///     .arg("-q").arg("80")
///     .arg("/tmp/in.png")
///     .arg("-o").arg("/tmp/in.webp")
///     .execute()
///     .await?;
/// println!("{}", output.combined());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl AsRef<OsStr>>) -> &mut Self {
        self.args
            .extend(iter.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`wp_core::Error::EncoderFailed`] if spawning fails (output carries
    ///   the spawn error) or the process exits non-zero (output carries the
    ///   combined stdout and stderr).
    /// - [`wp_core::Error::EncoderTimeout`] if the deadline passes. The child
    ///   is killed when the pending wait is dropped.
    pub async fn execute(&self) -> wp_core::Result<ToolOutput> {
        let program_name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(program = %self.program.display(), args = ?self.args, "spawning tool");

        let child = cmd.spawn().map_err(|e| {
            wp_core::Error::encoder(format!("failed to spawn {program_name}"), e.to_string())
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    return Err(wp_core::Error::encoder(
                        format!("{program_name} exited with {}", output.status),
                        tool_output.combined(),
                    ));
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(wp_core::Error::encoder(
                format!("I/O error waiting for {program_name}"),
                e.to_string(),
            )),
            Err(_elapsed) => {
                tracing::warn!(
                    tool = %program_name,
                    timeout = ?self.timeout,
                    "tool timed out; killing process"
                );
                Err(wp_core::Error::EncoderTimeout(self.timeout))
            }
        }
    }
}
