// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Filesystem adapter.
//!
//! All operations are scoped to a workspace root: relative paths resolve
//! against it and resolved paths escaping the root are rejected. Glob
//! results are capped and sorted by modification time so the most recently
//! touched files come back first.

pub mod watch;

pub use watch::{WatchEvent, WatchEventKind, WatchHandle};

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::fs;
use walkdir::WalkDir;

#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::error::ToolError;

/// Fixed result cap for glob queries.
pub const GLOB_LIMIT: usize = 100;

/// A directory entry.
#[derive(Debug, Clone)]
pub struct Dirent {
    /// Path relative to the workspace root.
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Metadata for a single path.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub is_dir: bool,
    pub is_file: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

/// One glob match with its metadata.
#[derive(Debug, Clone)]
pub struct GlobEntry {
    /// Path relative to the workspace root.
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub is_dir: bool,
}

/// Result of a glob query.
///
/// When `truncated` is true the match set hit [`GLOB_LIMIT`] and callers
/// must not assume completeness.
#[derive(Debug, Clone)]
pub struct GlobResult {
    pub entries: Vec<GlobEntry>,
    pub truncated: bool,
}

/// Filesystem API rooted at a workspace directory.
#[derive(Debug, Clone)]
pub struct WorkspaceFs {
    root: PathBuf,
}

impl WorkspaceFs {
    /// Create a filesystem adapter rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path against the workspace root.
    ///
    /// Absolute paths must already be under the root; relative paths are
    /// joined to it. `..` components are normalized lexically and any path
    /// that would land above the root is rejected.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ToolError> {
        let path = path.as_ref();

        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let normalized = normalize(&joined);
        if !normalized.starts_with(&self.root) {
            return Err(ToolError::PathEscape(path.display().to_string()));
        }

        Ok(normalized)
    }

    /// Whether a path exists.
    pub async fn exists(&self, path: impl AsRef<Path>) -> Result<bool, ToolError> {
        let path = self.resolve_path(path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Stat a path.
    pub async fn stat(&self, path: impl AsRef<Path>) -> Result<FileStat, ToolError> {
        let path = self.resolve_path(path)?;
        let meta = fs::metadata(&path).await?;

        Ok(FileStat {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            size: meta.len(),
            modified: meta.modified().ok().map(to_datetime),
            created: meta.created().ok().map(to_datetime),
        })
    }

    /// Read a file as UTF-8 text (lossy).
    pub async fn read_file(&self, path: impl AsRef<Path>) -> Result<String, ToolError> {
        let bytes = self.read_file_bytes(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a file as raw bytes.
    pub async fn read_file_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, ToolError> {
        let path = self.resolve_path(path)?;
        Ok(fs::read(&path).await?)
    }

    /// Write text to a file. With `create_dirs`, missing parent
    /// directories are created first.
    pub async fn write_file(
        &self,
        path: impl AsRef<Path>,
        content: &str,
        create_dirs: bool,
    ) -> Result<(), ToolError> {
        self.write_file_bytes(path, content.as_bytes(), create_dirs).await
    }

    /// Write raw bytes to a file.
    pub async fn write_file_bytes(
        &self,
        path: impl AsRef<Path>,
        content: &[u8],
        create_dirs: bool,
    ) -> Result<(), ToolError> {
        let path = self.resolve_path(path)?;

        if create_dirs {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent).await?;
                }
            }
        }

        fs::write(&path, content).await?;
        Ok(())
    }

    /// Create a directory; `recursive` creates missing parents too.
    pub async fn mkdir(&self, path: impl AsRef<Path>, recursive: bool) -> Result<(), ToolError> {
        let path = self.resolve_path(path)?;
        if recursive {
            fs::create_dir_all(&path).await?;
        } else {
            fs::create_dir(&path).await?;
        }
        Ok(())
    }

    /// Remove a file or directory tree.
    pub async fn rm(&self, path: impl AsRef<Path>) -> Result<(), ToolError> {
        let path = self.resolve_path(path)?;
        let meta = fs::metadata(&path).await?;
        if meta.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }

    /// Rename/move a path within the workspace.
    pub async fn rename(
        &self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
    ) -> Result<(), ToolError> {
        let from = self.resolve_path(from)?;
        let to = self.resolve_path(to)?;
        fs::rename(&from, &to).await?;
        Ok(())
    }

    /// List a directory. With `recursive`, walks the whole subtree;
    /// `ignore` globs filter out matching relative paths.
    pub async fn read_dir(
        &self,
        path: impl AsRef<Path>,
        recursive: bool,
        ignore: &[String],
    ) -> Result<Vec<Dirent>, ToolError> {
        let dir = self.resolve_path(path)?;

        let meta = fs::metadata(&dir).await?;
        if !meta.is_dir() {
            return Err(ToolError::InvalidInput(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let ignore_set = build_glob_set(ignore)?;
        let root = self.root.clone();

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut entries = Vec::new();

        let mut walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter();

        while let Some(entry) = walker.next() {
            let Ok(entry) = entry else { continue };

            let rel = match entry.path().strip_prefix(&root) {
                Ok(r) => r.to_path_buf(),
                Err(_) => continue,
            };

            if let Some(set) = &ignore_set {
                if set.is_match(&rel) {
                    // Ignored directories are pruned whole
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    continue;
                }
            }

            let meta = entry.metadata().ok();
            entries.push(Dirent {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type().is_dir(),
                size: meta.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: meta.and_then(|m| m.modified().ok()).map(to_datetime),
                path: rel,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Find files matching a glob pattern.
    ///
    /// Returns at most [`GLOB_LIMIT`] entries sorted by modification time
    /// descending, with `truncated` set if more matches existed.
    pub async fn glob(&self, pattern: &str) -> Result<GlobResult, ToolError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ToolError::InvalidInput(
                "pattern must not be empty".to_string(),
            ));
        }

        let glob = Glob::new(pattern)
            .map_err(|e| ToolError::InvalidInput(format!("Invalid glob pattern: {e}")))?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let glob_set = builder
            .build()
            .map_err(|e| ToolError::InvalidInput(format!("Failed to build glob set: {e}")))?;

        let mut entries: Vec<GlobEntry> = Vec::new();
        let mut truncated = false;

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(r) => r.to_path_buf(),
                Err(_) => continue,
            };

            if !glob_set.is_match(&rel) {
                continue;
            }

            if entries.len() >= GLOB_LIMIT {
                truncated = true;
                break;
            }

            let meta = entry.metadata().ok();
            entries.push(GlobEntry {
                size: meta.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: meta.and_then(|m| m.modified().ok()).map(to_datetime),
                is_dir: false,
                path: rel,
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified));

        #[cfg(feature = "telemetry")]
        debug!(pattern, matches = entries.len(), truncated, "Glob complete");

        Ok(GlobResult { entries, truncated })
    }

    /// Watch a path for changes. Events are debounced; the returned handle
    /// delivers them and stops the watch when told to.
    pub fn watch(&self, path: impl AsRef<Path>) -> Result<WatchHandle, ToolError> {
        let path = self.resolve_path(path)?;
        watch::spawn_watch(self.root.clone(), path)
    }
}

fn to_datetime(time: SystemTime) -> DateTime<Utc> {
    time.into()
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>, ToolError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ToolError::InvalidInput(format!("Invalid ignore pattern: {e}")))?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| ToolError::InvalidInput(format!("Failed to build ignore set: {e}")))
}

/// Lexically normalize a path, folding `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture() -> (tempfile::TempDir, WorkspaceFs) {
        let temp = tempdir().unwrap();
        let ws = WorkspaceFs::new(temp.path().canonicalize().unwrap());
        (temp, ws)
    }

    #[test]
    fn test_resolve_path_relative() {
        let (_temp, ws) = fixture();
        let resolved = ws.resolve_path("sub/file.txt").unwrap();
        assert!(resolved.starts_with(ws.root()));
    }

    #[test]
    fn test_resolve_path_escape_rejected() {
        let (_temp, ws) = fixture();
        let result = ws.resolve_path("../outside.txt");
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
    }

    #[test]
    fn test_resolve_path_dotdot_inside_root() {
        let (_temp, ws) = fixture();
        let resolved = ws.resolve_path("a/../b.txt").unwrap();
        assert_eq!(resolved, ws.root().join("b.txt"));
    }

    #[test]
    fn test_resolve_path_absolute_outside_rejected() {
        let (_temp, ws) = fixture();
        let result = ws.resolve_path("/etc/passwd");
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
    }

    #[tokio::test]
    async fn test_write_and_read_file() {
        let (_temp, ws) = fixture();
        ws.write_file("test.txt", "content", false).await.unwrap();
        assert_eq!(ws.read_file("test.txt").await.unwrap(), "content");
    }

    #[tokio::test]
    async fn test_write_file_creates_dirs() {
        let (_temp, ws) = fixture();
        ws.write_file("nested/dir/file.txt", "x", true).await.unwrap();
        assert!(ws.exists("nested/dir/file.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_file_missing_parent_fails() {
        let (_temp, ws) = fixture();
        let result = ws.write_file("missing/file.txt", "x", false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stat() {
        let (_temp, ws) = fixture();
        ws.write_file("file.txt", "12345", false).await.unwrap();

        let stat = ws.stat("file.txt").await.unwrap();
        assert!(stat.is_file);
        assert!(!stat.is_dir);
        assert_eq!(stat.size, 5);
        assert!(stat.modified.is_some());
    }

    #[tokio::test]
    async fn test_stat_missing() {
        let (_temp, ws) = fixture();
        let result = ws.stat("missing.txt").await;
        assert!(matches!(result, Err(ToolError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_mkdir_rm_rename() {
        let (_temp, ws) = fixture();

        ws.mkdir("a/b/c", true).await.unwrap();
        assert!(ws.exists("a/b/c").await.unwrap());

        ws.write_file("a/b/c/f.txt", "x", false).await.unwrap();
        ws.rename("a/b/c/f.txt", "a/b/c/g.txt").await.unwrap();
        assert!(!ws.exists("a/b/c/f.txt").await.unwrap());
        assert!(ws.exists("a/b/c/g.txt").await.unwrap());

        ws.rm("a").await.unwrap();
        assert!(!ws.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_dir_flat() {
        let (_temp, ws) = fixture();
        ws.write_file("one.txt", "1", false).await.unwrap();
        ws.mkdir("sub", false).await.unwrap();
        ws.write_file("sub/two.txt", "2", false).await.unwrap();

        let entries = ws.read_dir(".", false, &[]).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"one.txt"));
        assert!(names.contains(&"sub"));
        assert!(!names.contains(&"two.txt"));
    }

    #[tokio::test]
    async fn test_read_dir_recursive_with_ignore() {
        let (_temp, ws) = fixture();
        ws.write_file("keep.txt", "1", false).await.unwrap();
        ws.write_file("node_modules/skip.js", "2", true).await.unwrap();

        let entries = ws
            .read_dir(".", true, &["node_modules/**".to_string()])
            .await
            .unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"keep.txt"));
        assert!(!names.contains(&"skip.js"));
    }

    #[tokio::test]
    async fn test_read_dir_not_a_directory() {
        let (_temp, ws) = fixture();
        ws.write_file("file.txt", "x", false).await.unwrap();

        let result = ws.read_dir("file.txt", false, &[]).await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_glob_basic() {
        let (_temp, ws) = fixture();
        ws.write_file("src/main.rs", "fn main() {}", true).await.unwrap();
        ws.write_file("src/lib.rs", "// lib", true).await.unwrap();
        ws.write_file("readme.md", "# hi", false).await.unwrap();

        let result = ws.glob("**/*.rs").await.unwrap();
        assert_eq!(result.entries.len(), 2);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_glob_truncation() {
        let (_temp, ws) = fixture();
        for i in 0..GLOB_LIMIT + 50 {
            ws.write_file(format!("f{i}.txt"), "x", false).await.unwrap();
        }

        let result = ws.glob("*.txt").await.unwrap();
        assert_eq!(result.entries.len(), GLOB_LIMIT);
        assert!(result.truncated);
    }

    #[tokio::test]
    async fn test_glob_under_limit_not_truncated() {
        let (_temp, ws) = fixture();
        for i in 0..50 {
            ws.write_file(format!("f{i}.txt"), "x", false).await.unwrap();
        }

        let result = ws.glob("*.txt").await.unwrap();
        assert_eq!(result.entries.len(), 50);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_glob_sorted_by_mtime_desc() {
        let (_temp, ws) = fixture();
        ws.write_file("old.txt", "x", false).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        ws.write_file("new.txt", "y", false).await.unwrap();

        let result = ws.glob("*.txt").await.unwrap();
        assert_eq!(result.entries[0].path, PathBuf::from("new.txt"));
    }

    #[tokio::test]
    async fn test_glob_invalid_pattern() {
        let (_temp, ws) = fixture();
        let result = ws.glob("[invalid").await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }
}
