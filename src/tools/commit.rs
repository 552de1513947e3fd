// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Auto-commit support for mutating tools.
//!
//! After a mutating tool succeeds, the working tree is compared against
//! the status captured before execution; when the change counts differ,
//! everything is staged and committed. Auto-commit is best-effort
//! throughout: a workspace without a git repository, or a failing
//! commit, never turns a successful tool result into a failure.

use tracing::{debug, warn};

use crate::git::{CommitOptions, Git, GitStatus};

/// Capture the working-tree status before a mutation. Returns `None`
/// when the workspace has no repository (or status fails), which
/// disables auto-commit for that call.
pub async fn capture_status(git: &Git) -> Option<GitStatus> {
    match git.status().await {
        Ok(status) => Some(status),
        Err(err) => {
            debug!(error = %err, "Pre-mutation status unavailable, auto-commit disabled for this call");
            None
        }
    }
}

/// Stage and commit if the working tree changed relative to `pre`.
///
/// Returns the new commit hash, or `None` when nothing changed, the
/// pre-status was unavailable, or any git step failed.
pub async fn commit_if_changed(
    git: &Git,
    pre: Option<&GitStatus>,
    tool_name: &str,
) -> Option<String> {
    let pre = pre?;

    let post = match git.status().await {
        Ok(status) => status,
        Err(err) => {
            warn!(error = %err, "Post-mutation status failed, skipping auto-commit");
            return None;
        }
    };

    if !post.differs_from(pre) {
        return None;
    }

    if let Err(err) = git.add(&[]).await {
        warn!(error = %err, "Auto-commit staging failed");
        return None;
    }

    let options = CommitOptions {
        message: format!("Auto-commit: {tool_name}"),
        all: false,
        allow_empty: false,
    };
    match git.commit(&options).await {
        Ok(result) => {
            debug!(hash = %result.hash, tool = %tool_name, "Auto-committed workspace changes");
            Some(result.hash)
        }
        Err(err) => {
            warn!(error = %err, "Auto-commit failed");
            None
        }
    }
}
