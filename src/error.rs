// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the cradle workspace sandbox.
//!
//! This module provides strongly-typed errors for each subsystem,
//! using `thiserror` for ergonomic error definitions and `anyhow` for
//! error propagation at the crate boundary.

use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Path escapes workspace root: {0}")]
    PathEscape(String),
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

/// Errors that can occur during git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("git {command} failed: {message}")]
    CommandFailed {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl GitError {
    /// Create a command-failure error from captured output.
    pub fn command(
        command: impl Into<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
            exit_code,
        }
    }
}

impl From<std::io::Error> for GitError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

/// Errors that can occur in the workspace lifecycle and resolver.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Sandbox creation failed: {0}")]
    CreationFailed(String),

    #[error("Connection to sandbox {id} failed: {message}")]
    ConnectionFailed { id: String, message: String },

    #[error("Workspace is not active")]
    NotActive,

    #[error("Sandbox not found: {0}")]
    NotFound(String),

    #[error("Sandbox provider error: {0}")]
    Provider(String),

    #[error("Lease error: {0}")]
    Lease(#[from] LeaseError),
}

/// Errors from the leased-liveness store.
///
/// Liveness checks treat any store failure as "not alive", so these errors
/// rarely propagate past the lease module.
#[derive(Error, Debug)]
pub enum LeaseError {
    #[error("Lease store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Lease operation failed: {0}")]
    OperationFailed(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

impl From<GitError> for ToolError {
    fn from(err: GitError) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}

impl From<WorkspaceError> for ToolError {
    fn from(err: WorkspaceError) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let tool_err: ToolError = io_err.into();
        assert!(matches!(tool_err, ToolError::FileNotFound(_)));
    }

    #[test]
    fn test_tool_error_from_io_permission() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let tool_err: ToolError = io_err.into();
        assert!(matches!(tool_err, ToolError::PermissionDenied(_)));
    }

    #[test]
    fn test_git_error_display() {
        let err = GitError::command("commit", "empty commit message", Some(1));
        let display = format!("{err}");
        assert!(display.contains("commit"));
        assert!(display.contains("empty commit message"));
    }

    #[test]
    fn test_workspace_error_from_lease() {
        let lease_err = LeaseError::StoreUnavailable("connection refused".to_string());
        let ws_err: WorkspaceError = lease_err.into();
        assert!(matches!(ws_err, WorkspaceError::Lease(_)));
    }

    #[test]
    fn test_config_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid json");
        let json_err = result.unwrap_err();
        let config_err: ConfigError = json_err.into();
        assert!(matches!(config_err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_tool_error_from_git() {
        let git_err = GitError::ParseError("bad header".to_string());
        let tool_err: ToolError = git_err.into();
        assert!(matches!(tool_err, ToolError::ExecutionFailed(_)));
    }
}
