// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed records produced by git operations.

use serde::{Deserialize, Serialize};

/// Structured repository status built from porcelain output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitStatus {
    pub branch: String,
    pub clean: bool,
    pub modified: Vec<String>,
    pub staged: Vec<String>,
    pub untracked: Vec<String>,
    pub deleted: Vec<String>,
    pub renamed: Vec<GitRename>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahead: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behind: Option<u32>,
}

impl GitStatus {
    /// Counts across every tracked-file dimension, used to decide whether
    /// two statuses differ for auto-commit purposes.
    pub fn change_counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.modified.len(),
            self.staged.len(),
            self.untracked.len(),
            self.deleted.len(),
            self.renamed.len(),
        )
    }

    /// Whether any tracked-file dimension differs from `other`.
    pub fn differs_from(&self, other: &GitStatus) -> bool {
        self.change_counts() != other.change_counts()
    }
}

/// A rename detected in status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRename {
    pub from: String,
    pub to: String,
}

/// One commit in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLogEntry {
    pub hash: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub message: String,
}

/// One local or remote-tracking branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitBranch {
    pub name: String,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// A configured remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRemote {
    pub name: String,
    pub url: String,
}

/// Outcome of a git operation that does not return a structured record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitOpResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl GitOpResult {
    /// A successful result carrying output.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            exit_code: Some(0),
        }
    }

    /// A failed result carrying the captured error text.
    pub fn failed(error: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            exit_code,
        }
    }

    /// A non-fatal skip, used when a remote operation has no remote.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(reason.into()),
            error: None,
            exit_code: None,
        }
    }
}

/// Options for creating a commit.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub message: String,
    /// Stage all tracked changes before committing (`-a`).
    pub all: bool,
    /// Allow a commit with no changes.
    pub allow_empty: bool,
}

impl CommitOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommitResult {
    pub hash: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_differs_from() {
        let before = GitStatus::default();
        let mut after = GitStatus::default();
        assert!(!after.differs_from(&before));

        after.untracked.push("new.txt".to_string());
        assert!(after.differs_from(&before));
    }

    #[test]
    fn test_op_result_constructors() {
        assert!(GitOpResult::ok("done").success);
        assert!(!GitOpResult::failed("boom", Some(1)).success);

        let skipped = GitOpResult::skipped("no remote configured");
        assert!(skipped.success);
        assert!(skipped.exit_code.is_none());
    }
}
