// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Pure parsers for git textual output.
//!
//! Everything here parses porcelain or pretty-format text produced by the
//! command builders in [`super::command`]; no subprocess work happens in
//! this module.

use once_cell::sync::Lazy;
use regex::Regex;

use super::command::LOG_FIELD_SEP;
use super::types::{GitBranch, GitLogEntry, GitRemote, GitRename, GitStatus};
use crate::error::GitError;

static AHEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?ahead (\d+)").unwrap());
static BEHIND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"behind (\d+)").unwrap());

/// Matches the bracketed short hash in commit output, e.g.
/// `[main 1a2b3c4] msg` or `[main (root-commit) 1a2b3c4] msg`.
static COMMIT_HASH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:[^\s\]]+\s+)?(?:\(root-commit\)\s+)?([0-9a-f]{7,40})\]").unwrap()
});

/// Parse `git status --porcelain=v1 -b` output.
pub fn parse_status(output: &str) -> GitStatus {
    let mut status = GitStatus {
        clean: true,
        ..Default::default()
    };

    for line in output.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            parse_branch_header(header, &mut status);
            continue;
        }

        if line.len() < 3 {
            continue;
        }

        status.clean = false;

        let index = line.as_bytes()[0] as char;
        let worktree = line.as_bytes()[1] as char;
        let path = line[3..].to_string();

        if index == '?' && worktree == '?' {
            status.untracked.push(path);
            continue;
        }

        if index == 'M' || worktree == 'M' {
            status.modified.push(path.clone());
        }

        if matches!(index, 'A' | 'M' | 'D' | 'R') {
            status.staged.push(path.clone());
        }

        if index == 'D' || worktree == 'D' {
            status.deleted.push(path.clone());
        }

        if index == 'R' {
            if let Some((from, to)) = path.split_once(" -> ") {
                status.renamed.push(GitRename {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
    }

    status
}

fn parse_branch_header(header: &str, status: &mut GitStatus) {
    // "No commits yet on main" phrasing from a fresh repository
    if let Some(branch) = header.strip_prefix("No commits yet on ") {
        status.branch = branch.trim().to_string();
        return;
    }

    let branch = match header.split_once("...") {
        Some((local, _)) => local,
        None => header,
    };
    status.branch = branch.trim().to_string();

    if let Some(caps) = AHEAD_RE.captures(header) {
        status.ahead = caps[1].parse().ok();
    }
    if let Some(caps) = BEHIND_RE.captures(header) {
        status.behind = caps[1].parse().ok();
    }
}

/// Extract the short commit hash from `git commit` output.
pub fn parse_commit_hash(output: &str) -> Option<String> {
    COMMIT_HASH_RE
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// Parse unit-separated `git log` output built by [`super::command::log`].
pub fn parse_log(output: &str) -> Result<Vec<GitLogEntry>, GitError> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(LOG_FIELD_SEP).collect();
        if fields.len() != 5 {
            return Err(GitError::ParseError(format!(
                "expected 5 log fields, got {}: {line}",
                fields.len()
            )));
        }

        entries.push(GitLogEntry {
            hash: fields[0].to_string(),
            author: fields[1].to_string(),
            email: fields[2].to_string(),
            date: fields[3].to_string(),
            message: fields[4].to_string(),
        });
    }

    Ok(entries)
}

/// Parse `git branch -v` output.
pub fn parse_branches(output: &str) -> Vec<GitBranch> {
    let mut branches = Vec::new();

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let current = line.starts_with('*');
        let rest = line.trim_start_matches('*').trim_start();

        // Detached HEAD rows look like "(HEAD detached at 1a2b3c4)"
        if rest.starts_with('(') {
            continue;
        }

        let mut parts = rest.split_whitespace();
        let name = match parts.next() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let commit = parts.next().map(|s| s.to_string());

        branches.push(GitBranch {
            name,
            current,
            commit,
        });
    }

    branches
}

/// Parse `git remote -v` output, one record per remote name.
pub fn parse_remotes(output: &str) -> Vec<GitRemote> {
    let mut remotes: Vec<GitRemote> = Vec::new();

    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
            continue;
        };

        if remotes.iter().any(|r| r.name == name) {
            continue;
        }

        remotes.push(GitRemote {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    remotes
}
