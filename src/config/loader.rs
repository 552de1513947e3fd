// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading from files.
//!
//! Handles loading workspace settings from JSON and YAML files in the
//! workspace root.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::WorkspaceSettings;

/// Config file names to search for (in order).
pub const CONFIG_FILES: &[&str] = &[".cradle.json", ".cradle.yaml", ".cradle/config.json"];

/// Load workspace settings from the workspace root.
///
/// Searches for config files in the following order:
/// 1. .cradle.json
/// 2. .cradle.yaml
/// 3. .cradle/config.json
pub fn load_settings(workspace_root: &Path) -> Result<Option<WorkspaceSettings>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = workspace_root.join(filename);
        if path.exists() {
            return load_settings_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load a settings file (JSON or YAML, by extension).
pub fn load_settings_file(path: &Path) -> Result<WorkspaceSettings, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Save workspace settings to a file.
pub fn save_settings(
    workspace_root: &Path,
    settings: &WorkspaceSettings,
    filename: Option<&str>,
) -> Result<PathBuf, ConfigError> {
    let filename = filename.unwrap_or(".cradle.json");
    let path = workspace_root.join(filename);

    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, content)?;

    Ok(path)
}

/// Find the workspace root by searching for config files.
///
/// Walks up the directory tree from `start` until it finds a directory
/// containing a config file or reaches the filesystem root.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        for filename in CONFIG_FILES {
            if current.join(filename).exists() {
                return Some(current);
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::LivenessPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_config_files_order() {
        assert_eq!(CONFIG_FILES.len(), 3);
        assert_eq!(CONFIG_FILES[0], ".cradle.json");
    }

    #[test]
    fn test_load_settings_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_settings(temp.path());
        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_load_settings_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".cradle.json"),
            r#"{"sandbox": {"timeoutMs": 5000}, "autoCommit": false}"#,
        )
        .unwrap();

        let settings = load_settings(temp.path()).unwrap().unwrap();
        assert_eq!(settings.sandbox.timeout_ms, Some(5000));
        assert!(!settings.auto_commit);
    }

    #[test]
    fn test_load_settings_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".cradle.yaml"),
            "sandbox:\n  timeoutMs: 7000\nliveness:\n  mode: lazy\n",
        )
        .unwrap();

        let settings = load_settings(temp.path()).unwrap().unwrap();
        assert_eq!(settings.sandbox.timeout_ms, Some(7000));
        assert_eq!(settings.liveness, LivenessPolicy::Lazy);
    }

    #[test]
    fn test_load_settings_invalid_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".cradle.json"), "{not json").unwrap();

        let result = load_settings(temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_settings_round_trip() {
        let temp = TempDir::new().unwrap();
        let settings = WorkspaceSettings {
            remote_base_url: Some("https://sandboxes.example.com".to_string()),
            ..Default::default()
        };

        let path = save_settings(temp.path(), &settings, None).unwrap();
        assert!(path.exists());

        let loaded = load_settings(temp.path()).unwrap().unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_find_workspace_root() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&subdir).unwrap();
        std::fs::write(temp.path().join(".cradle.json"), "{}").unwrap();

        let found = find_workspace_root(&subdir);
        assert_eq!(found.unwrap(), temp.path());
    }

    #[test]
    fn test_find_workspace_root_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(find_workspace_root(temp.path()).is_none());
    }
}
