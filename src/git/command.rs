// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Pure builders for git argument vectors.
//!
//! Every operation is expressed as a `Vec<String>` of arguments passed to
//! the `git` binary without a shell, so user-supplied text (commit
//! messages, branch names, paths) can never be interpreted as shell
//! syntax.

use super::types::CommitOptions;

/// Field separator used in log pretty-formats. Unit separator is safe
/// because it cannot appear in commit metadata.
pub const LOG_FIELD_SEP: char = '\x1f';

pub fn init() -> Vec<String> {
    args(&["init"])
}

pub fn clone(url: &str, dir: Option<&str>) -> Vec<String> {
    let mut v = args(&["clone", url]);
    if let Some(dir) = dir {
        v.push(dir.to_string());
    }
    v
}

/// Porcelain v1 status with branch header.
pub fn status() -> Vec<String> {
    args(&["status", "--porcelain=v1", "-b"])
}

pub fn add(paths: &[String]) -> Vec<String> {
    let mut v = args(&["add", "--"]);
    if paths.is_empty() {
        v.pop();
        v.push("-A".to_string());
    } else {
        v.extend(paths.iter().cloned());
    }
    v
}

pub fn commit(options: &CommitOptions) -> Vec<String> {
    let mut v = args(&["commit"]);
    if options.all {
        v.push("-a".to_string());
    }
    if options.allow_empty {
        v.push("--allow-empty".to_string());
    }
    v.push("-m".to_string());
    v.push(options.message.clone());
    v
}

pub fn push(remote: Option<&str>, branch: Option<&str>) -> Vec<String> {
    let mut v = args(&["push"]);
    if let Some(remote) = remote {
        v.push(remote.to_string());
        if let Some(branch) = branch {
            v.push(branch.to_string());
        }
    }
    v
}

pub fn pull(remote: Option<&str>, branch: Option<&str>) -> Vec<String> {
    let mut v = args(&["pull"]);
    if let Some(remote) = remote {
        v.push(remote.to_string());
        if let Some(branch) = branch {
            v.push(branch.to_string());
        }
    }
    v
}

pub fn fetch(remote: Option<&str>) -> Vec<String> {
    let mut v = args(&["fetch"]);
    if let Some(remote) = remote {
        v.push(remote.to_string());
    }
    v
}

pub fn checkout(target: &str, create: bool) -> Vec<String> {
    let mut v = args(&["checkout"]);
    if create {
        v.push("-b".to_string());
    }
    v.push(target.to_string());
    v
}

/// List branches (`branch -v`) or create/delete one.
pub fn branch(name: Option<&str>, delete: bool) -> Vec<String> {
    let mut v = args(&["branch"]);
    match name {
        Some(name) if delete => {
            v.push("-D".to_string());
            v.push(name.to_string());
        }
        Some(name) => v.push(name.to_string()),
        None => v.push("-v".to_string()),
    }
    v
}

pub fn merge(branch: &str) -> Vec<String> {
    args(&["merge", branch])
}

pub fn rebase(onto: &str) -> Vec<String> {
    args(&["rebase", onto])
}

/// Log with a machine-parseable unit-separated format.
pub fn log(limit: usize) -> Vec<String> {
    vec![
        "log".to_string(),
        format!("--max-count={limit}"),
        format!("--pretty=format:%H{LOG_FIELD_SEP}%an{LOG_FIELD_SEP}%ae{LOG_FIELD_SEP}%aI{LOG_FIELD_SEP}%s"),
    ]
}

pub fn diff(cached: bool, paths: &[String]) -> Vec<String> {
    let mut v = args(&["diff"]);
    if cached {
        v.push("--cached".to_string());
    }
    if !paths.is_empty() {
        v.push("--".to_string());
        v.extend(paths.iter().cloned());
    }
    v
}

pub fn stash(pop: bool) -> Vec<String> {
    if pop {
        args(&["stash", "pop"])
    } else {
        args(&["stash"])
    }
}

pub fn tag(name: Option<&str>) -> Vec<String> {
    let mut v = args(&["tag"]);
    if let Some(name) = name {
        v.push(name.to_string());
    }
    v
}

/// List remotes verbosely, or add one.
pub fn remote(add: Option<(&str, &str)>) -> Vec<String> {
    match add {
        Some((name, url)) => args(&["remote", "add", name, url]),
        None => args(&["remote", "-v"]),
    }
}

pub fn reset(target: Option<&str>, hard: bool) -> Vec<String> {
    let mut v = args(&["reset"]);
    if hard {
        v.push("--hard".to_string());
    }
    if let Some(target) = target {
        v.push(target.to_string());
    }
    v
}

pub fn revert(commit: &str) -> Vec<String> {
    args(&["revert", "--no-edit", commit])
}

pub fn cherry_pick(commit: &str) -> Vec<String> {
    args(&["cherry-pick", commit])
}

/// Remove untracked files (`clean -fd`).
pub fn clean() -> Vec<String> {
    args(&["clean", "-fd"])
}

pub fn config(key: &str, value: Option<&str>) -> Vec<String> {
    let mut v = args(&["config", key]);
    if let Some(value) = value {
        v.push(value.to_string());
    }
    v
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_porcelain_with_branch() {
        assert_eq!(status(), vec!["status", "--porcelain=v1", "-b"]);
    }

    #[test]
    fn test_add_all_when_no_paths() {
        assert_eq!(add(&[]), vec!["add", "-A"]);
    }

    #[test]
    fn test_add_paths_behind_separator() {
        let v = add(&["a.txt".to_string(), "b.txt".to_string()]);
        assert_eq!(v, vec!["add", "--", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_commit_message_is_single_argument() {
        let options = CommitOptions::new("fix; rm -rf / $(oops)");
        let v = commit(&options);
        // The whole message rides in one argv slot, never a shell string
        assert_eq!(v.last().unwrap(), "fix; rm -rf / $(oops)");
        assert_eq!(v[v.len() - 2], "-m");
    }

    #[test]
    fn test_commit_flags() {
        let options = CommitOptions {
            message: "msg".to_string(),
            all: true,
            allow_empty: true,
        };
        let v = commit(&options);
        assert!(v.contains(&"-a".to_string()));
        assert!(v.contains(&"--allow-empty".to_string()));
    }

    #[test]
    fn test_checkout_create() {
        assert_eq!(checkout("feature", true), vec!["checkout", "-b", "feature"]);
        assert_eq!(checkout("main", false), vec!["checkout", "main"]);
    }

    #[test]
    fn test_branch_list_and_delete() {
        assert_eq!(branch(None, false), vec!["branch", "-v"]);
        assert_eq!(branch(Some("old"), true), vec!["branch", "-D", "old"]);
    }

    #[test]
    fn test_log_format_uses_field_separator() {
        let v = log(10);
        assert!(v[2].contains('\x1f'));
        assert_eq!(v[1], "--max-count=10");
    }

    #[test]
    fn test_remote_list_and_add() {
        assert_eq!(remote(None), vec!["remote", "-v"]);
        assert_eq!(
            remote(Some(("origin", "https://example.com/r.git"))),
            vec!["remote", "add", "origin", "https://example.com/r.git"]
        );
    }
}
