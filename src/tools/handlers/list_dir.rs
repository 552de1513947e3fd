// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Directory-listing tool handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::tools::parse_arguments;
use crate::workspace::Workspace;

/// Handler for the `list_dir` tool.
pub struct ListDirHandler;

/// Arguments for the list_dir tool.
#[derive(Debug, Deserialize)]
struct ListDirArgs {
    /// Workspace-relative directory (default: the root).
    #[serde(default = "default_path")]
    path: String,

    /// Recurse into subdirectories.
    #[serde(default)]
    recursive: bool,

    /// Glob patterns to skip.
    #[serde(default)]
    ignore: Vec<String>,
}

fn default_path() -> String {
    ".".to_string()
}

#[async_trait]
impl ToolHandler for ListDirHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_dir", "List directory contents in the workspace").with_schema(
            InputSchema::new()
                .with_property(
                    "path",
                    serde_json::json!({
                        "type": "string",
                        "description": "Workspace-relative directory (default: workspace root)"
                    }),
                )
                .with_property(
                    "recursive",
                    serde_json::json!({
                        "type": "boolean",
                        "description": "Recurse into subdirectories"
                    }),
                )
                .with_property(
                    "ignore",
                    serde_json::json!({
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Glob patterns to skip"
                    }),
                ),
        )
    }

    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let args: ListDirArgs = parse_arguments(&input)?;

        let entries = workspace
            .fs()
            .read_dir(&args.path, args.recursive, &args.ignore)
            .await?;

        let mut lines = Vec::with_capacity(entries.len());
        for entry in &entries {
            let marker = if entry.is_dir { "/" } else { "" };
            lines.push(format!("{}{marker}", entry.path.display()));
        }

        let metadata = serde_json::json!({
            "path": args.path,
            "count": entries.len(),
        });

        Ok(ToolOutput::success(lines.join("\n")).with_metadata(metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::sandbox::SandboxInstance;
    use tempfile::tempdir;

    fn test_workspace(root: &std::path::Path) -> Arc<Workspace> {
        let now = chrono::Utc::now();
        Arc::new(Workspace::new(SandboxInstance {
            id: "list-test".to_string(),
            active: true,
            root: root.to_path_buf(),
            created_at: now,
            last_activity: now,
            config: SandboxConfig::default(),
        }))
    }

    #[tokio::test]
    async fn test_list_root() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();

        let output = ListDirHandler
            .execute(test_workspace(temp.path()), serde_json::json!({}))
            .await
            .unwrap();
        assert!(output.content.contains("a.txt"));
        assert!(output.content.contains("sub/"));
    }

    #[tokio::test]
    async fn test_list_recursive_with_ignore() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::create_dir_all(temp.path().join("target")).unwrap();
        std::fs::write(temp.path().join("src/main.rs"), "").unwrap();
        std::fs::write(temp.path().join("target/out.bin"), "").unwrap();

        let output = ListDirHandler
            .execute(
                test_workspace(temp.path()),
                serde_json::json!({"recursive": true, "ignore": ["target"]}),
            )
            .await
            .unwrap();
        assert!(output.content.contains("main.rs"));
        assert!(!output.content.contains("out.bin"));
    }

    #[tokio::test]
    async fn test_list_file_is_an_error() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), "").unwrap();

        let result = ListDirHandler
            .execute(
                test_workspace(temp.path()),
                serde_json::json!({"path": "a.txt"}),
            )
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }
}
