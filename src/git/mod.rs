// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Version-control adapter.
//!
//! Wraps the pure builders in [`command`] and parsers in [`parse`] around
//! the shell adapter's argv execution. Every operation follows the same
//! shape: build an argument vector, execute `git` without a shell, parse
//! the textual output into a typed result.

pub mod command;
pub mod parse;
pub mod types;

pub use types::{
    CommitOptions, GitBranch, GitCommitResult, GitLogEntry, GitOpResult, GitRemote, GitRename,
    GitStatus,
};

#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::error::GitError;
use crate::shell::Shell;

/// Timeout for individual git commands in milliseconds.
pub const GIT_TIMEOUT_MS: u64 = 60_000;

/// Default number of log entries returned.
pub const DEFAULT_LOG_LIMIT: usize = 20;

/// Git operations bound to one workspace root.
#[derive(Debug, Clone)]
pub struct Git {
    shell: Shell,
}

impl Git {
    /// Create a git adapter executing in `shell`'s workspace root.
    pub fn new(shell: Shell) -> Self {
        Self { shell }
    }

    /// Initialize a repository in the workspace root.
    pub async fn init(&self) -> Result<GitOpResult, GitError> {
        self.run_op(command::init()).await
    }

    /// Clone a repository into the workspace.
    pub async fn clone_repo(&self, url: &str, dir: Option<&str>) -> Result<GitOpResult, GitError> {
        self.run_op(command::clone(url, dir)).await
    }

    /// Structured repository status from porcelain output.
    pub async fn status(&self) -> Result<GitStatus, GitError> {
        let output = self.run_expecting_success("status", command::status()).await?;
        Ok(parse::parse_status(&output))
    }

    /// Stage paths; with an empty slice, stages everything (`-A`).
    pub async fn add(&self, paths: &[String]) -> Result<GitOpResult, GitError> {
        self.run_op(command::add(paths)).await
    }

    /// Create a commit, returning the extracted short hash.
    pub async fn commit(&self, options: &CommitOptions) -> Result<GitCommitResult, GitError> {
        let result = self.run(command::commit(options)).await?;

        if !result.success() {
            return Err(GitError::command(
                "commit",
                result.combined_output(),
                Some(result.exit_code),
            ));
        }

        let hash = parse::parse_commit_hash(&result.stdout).ok_or_else(|| {
            GitError::ParseError(format!("no commit hash in output: {}", result.stdout))
        })?;

        #[cfg(feature = "telemetry")]
        debug!(hash = %hash, "Commit created");

        Ok(GitCommitResult {
            hash,
            message: options.message.clone(),
        })
    }

    /// Push to a remote; skipped (non-fatal) when no remote is configured.
    pub async fn push(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<GitOpResult, GitError> {
        if !self.has_remote().await? {
            return Ok(GitOpResult::skipped("push skipped: no remote configured"));
        }
        self.run_op(command::push(remote, branch)).await
    }

    /// Pull from a remote; skipped (non-fatal) when no remote is configured.
    pub async fn pull(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<GitOpResult, GitError> {
        if !self.has_remote().await? {
            return Ok(GitOpResult::skipped("pull skipped: no remote configured"));
        }
        self.run_op(command::pull(remote, branch)).await
    }

    pub async fn fetch(&self, remote: Option<&str>) -> Result<GitOpResult, GitError> {
        self.run_op(command::fetch(remote)).await
    }

    /// Check out a branch or commit; with `create`, makes a new branch.
    pub async fn checkout(&self, target: &str, create: bool) -> Result<GitOpResult, GitError> {
        self.run_op(command::checkout(target, create)).await
    }

    /// List branches.
    pub async fn branches(&self) -> Result<Vec<GitBranch>, GitError> {
        let output = self
            .run_expecting_success("branch", command::branch(None, false))
            .await?;
        Ok(parse::parse_branches(&output))
    }

    /// Create a branch without switching to it.
    pub async fn create_branch(&self, name: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::branch(Some(name), false)).await
    }

    /// Delete a branch.
    pub async fn delete_branch(&self, name: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::branch(Some(name), true)).await
    }

    pub async fn merge(&self, branch: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::merge(branch)).await
    }

    pub async fn rebase(&self, onto: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::rebase(onto)).await
    }

    /// Commit history, newest first. A repository without commits yields
    /// an empty history.
    pub async fn log(&self, limit: usize) -> Result<Vec<GitLogEntry>, GitError> {
        let result = self.run(command::log(limit)).await?;
        if !result.success() {
            if result.stderr.contains("does not have any commits") {
                return Ok(Vec::new());
            }
            return Err(GitError::command("log", result.combined_output(), Some(result.exit_code)));
        }
        parse::parse_log(&result.stdout)
    }

    /// Diff of the worktree, or the index with `cached`.
    pub async fn diff(&self, cached: bool, paths: &[String]) -> Result<GitOpResult, GitError> {
        self.run_op(command::diff(cached, paths)).await
    }

    pub async fn stash(&self, pop: bool) -> Result<GitOpResult, GitError> {
        self.run_op(command::stash(pop)).await
    }

    /// List tags, or create one with `name`.
    pub async fn tag(&self, name: Option<&str>) -> Result<GitOpResult, GitError> {
        self.run_op(command::tag(name)).await
    }

    /// List configured remotes.
    pub async fn remotes(&self) -> Result<Vec<GitRemote>, GitError> {
        let output = self
            .run_expecting_success("remote", command::remote(None))
            .await?;
        Ok(parse::parse_remotes(&output))
    }

    /// Add a remote.
    pub async fn add_remote(&self, name: &str, url: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::remote(Some((name, url)))).await
    }

    pub async fn reset(&self, target: Option<&str>, hard: bool) -> Result<GitOpResult, GitError> {
        self.run_op(command::reset(target, hard)).await
    }

    pub async fn revert(&self, commit: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::revert(commit)).await
    }

    pub async fn cherry_pick(&self, commit: &str) -> Result<GitOpResult, GitError> {
        self.run_op(command::cherry_pick(commit)).await
    }

    /// Remove untracked files and directories.
    pub async fn clean(&self) -> Result<GitOpResult, GitError> {
        self.run_op(command::clean()).await
    }

    /// Read or set a config key.
    pub async fn config(&self, key: &str, value: Option<&str>) -> Result<GitOpResult, GitError> {
        self.run_op(command::config(key, value)).await
    }

    /// Whether the repository has at least one configured remote.
    ///
    /// A failed listing counts as "no remote" so push/pull degrade to a
    /// skip instead of a hard failure.
    async fn has_remote(&self) -> Result<bool, GitError> {
        let result = self.run(command::remote(None)).await?;
        Ok(result.success() && !result.stdout.trim().is_empty())
    }

    async fn run_op(&self, args: Vec<String>) -> Result<GitOpResult, GitError> {
        let result = self.run(args).await?;
        if result.success() {
            Ok(GitOpResult::ok(result.stdout))
        } else {
            Ok(GitOpResult::failed(
                result.combined_output(),
                Some(result.exit_code),
            ))
        }
    }

    async fn run_expecting_success(
        &self,
        op: &str,
        args: Vec<String>,
    ) -> Result<String, GitError> {
        let result = self.run(args).await?;
        if !result.success() {
            let output = result.combined_output();
            if output.contains("not a git repository") {
                return Err(GitError::NotARepository(
                    self.shell.root().display().to_string(),
                ));
            }
            return Err(GitError::command(op, output, Some(result.exit_code)));
        }
        Ok(result.stdout)
    }

    async fn run(&self, args: Vec<String>) -> Result<crate::shell::ExecResult, GitError> {
        self.shell
            .run_program("git", &args, GIT_TIMEOUT_MS)
            .await
            .map_err(|e| GitError::IoError(e.to_string()))
    }
}
