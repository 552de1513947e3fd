// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Shell adapter.
//!
//! Executes commands inside a workspace root with a bounded timeout and
//! captured stdout/stderr. Two entry points:
//!
//! - [`Shell::exec`] runs a command line through `bash -c` (the surface the
//!   bash tool uses)
//! - [`Shell::run_program`] runs a program with an argument vector and no
//!   shell, which is how the git adapter executes every command so that
//!   user-supplied text (commit messages, branch names) is never
//!   interpolated into a shell string

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::timeout;

#[cfg(feature = "telemetry")]
use tracing::{debug, warn};

use crate::error::ToolError;

/// Default timeout for command execution in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000; // 2 minutes

/// Maximum timeout for command execution in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 600_000; // 10 minutes

/// Cap on captured stdout/stderr bytes per stream.
pub const MAX_CAPTURE_BYTES: usize = 1024 * 1024; // 1 MiB

/// Notice appended when captured output is cut at the cap.
pub const TRUNCATION_NOTICE: &str = "\n... [output truncated]";

/// A command execution request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    /// The command line to execute.
    pub command: String,

    /// Timeout in milliseconds; clamped to [`MAX_TIMEOUT_MS`].
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Optional human-readable description of what the command does.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ExecRequest {
    /// Create a request with the default timeout.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            description: None,
        }
    }

    /// Set the timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
    pub timed_out: bool,
}

impl ExecResult {
    /// Whether the command exited zero without timing out.
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Combined stdout + stderr, for error messages.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Shell bound to a workspace root directory.
#[derive(Debug, Clone)]
pub struct Shell {
    root: PathBuf,
}

impl Shell {
    /// Create a shell rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root this shell executes in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Execute a command line through `bash -c`.
    pub async fn exec(&self, request: &ExecRequest) -> Result<ExecResult, ToolError> {
        if request.command.trim().is_empty() {
            return Err(ToolError::InvalidInput(
                "command must not be empty".to_string(),
            ));
        }

        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(&request.command);
        self.run(cmd, request.timeout_ms).await
    }

    /// Execute a program with an argument vector, bypassing the shell.
    pub async fn run_program(
        &self,
        program: &str,
        args: &[String],
        timeout_ms: u64,
    ) -> Result<ExecResult, ToolError> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        self.run(cmd, timeout_ms).await
    }

    async fn run(&self, mut cmd: Command, timeout_ms: u64) -> Result<ExecResult, ToolError> {
        let timeout_ms = timeout_ms.min(MAX_TIMEOUT_MS).max(1);
        let timeout_duration = Duration::from_millis(timeout_ms);

        cmd.current_dir(&self.root)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let output_result = timeout(timeout_duration, cmd.output()).await;
        let duration = start.elapsed();

        match output_result {
            Ok(Ok(output)) => {
                let stdout = cap_output(&String::from_utf8_lossy(&output.stdout));
                let stderr = cap_output(&String::from_utf8_lossy(&output.stderr));
                let exit_code = output.status.code().unwrap_or(-1);

                #[cfg(feature = "telemetry")]
                debug!(exit_code, duration_ms = duration.as_millis() as u64, "Command executed");

                Ok(ExecResult {
                    stdout,
                    stderr,
                    exit_code,
                    duration,
                    timed_out: false,
                })
            }
            Ok(Err(e)) => Err(ToolError::ExecutionFailed(format!(
                "Failed to execute command: {e}"
            ))),
            Err(_) => {
                #[cfg(feature = "telemetry")]
                warn!(timeout_ms, "Command timed out");

                Ok(ExecResult {
                    stdout: String::new(),
                    stderr: format!(
                        "Command timed out after {} seconds",
                        timeout_duration.as_secs_f64()
                    ),
                    exit_code: -1,
                    duration,
                    timed_out: true,
                })
            }
        }
    }
}

/// Cut captured output at [`MAX_CAPTURE_BYTES`], appending a notice.
fn cap_output(text: &str) -> String {
    if text.len() <= MAX_CAPTURE_BYTES {
        return text.to_string();
    }

    let mut end = MAX_CAPTURE_BYTES;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{TRUNCATION_NOTICE}", &text[..end])
}
