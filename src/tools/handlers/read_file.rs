// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Read-file tool handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::tools::{parse_arguments, truncate_text, DEFAULT_READ_LIMIT, MAX_LINE_LENGTH};
use crate::workspace::Workspace;

/// Handler for the `read_file` tool.
pub struct ReadFileHandler;

/// Arguments for the read_file tool.
#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    /// Workspace-relative path to read.
    path: String,

    /// 1-based line to start reading from.
    #[serde(default)]
    offset: Option<usize>,

    /// Maximum number of lines to return.
    #[serde(default)]
    limit: Option<usize>,
}

#[async_trait]
impl ToolHandler for ReadFileHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("read_file", "Read a file from the workspace").with_schema(
            InputSchema::new()
                .with_property(
                    "path",
                    serde_json::json!({
                        "type": "string",
                        "description": "Workspace-relative path to the file"
                    }),
                )
                .with_property(
                    "offset",
                    serde_json::json!({
                        "type": "integer",
                        "description": "1-based line number to start from"
                    }),
                )
                .with_property(
                    "limit",
                    serde_json::json!({
                        "type": "integer",
                        "description": "Maximum number of lines to read (default: 2000)"
                    }),
                )
                .with_required(vec!["path".to_string()]),
        )
    }

    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let args: ReadFileArgs = parse_arguments(&input)?;

        let content = workspace.fs().read_file(&args.path).await?;

        let offset = args.offset.unwrap_or(1).max(1);
        let limit = args.limit.unwrap_or(DEFAULT_READ_LIMIT);

        let total_lines = content.lines().count();
        let mut rendered = String::new();
        let mut shown = 0usize;
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if line_no < offset {
                continue;
            }
            if shown >= limit {
                break;
            }
            let line = truncate_text(line, MAX_LINE_LENGTH);
            rendered.push_str(&format!("{line_no:>6}\t{line}\n"));
            shown += 1;
        }

        if offset > 1 && shown == 0 {
            return Err(ToolError::InvalidInput(format!(
                "Offset {offset} is past the end of the file ({total_lines} lines)"
            )));
        }

        let metadata = serde_json::json!({
            "path": args.path,
            "totalLines": total_lines,
            "linesShown": shown,
        });

        Ok(ToolOutput::success(rendered).with_metadata(metadata))
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
            id: "read-test".to_string(),
            active: true,
            root: root.to_path_buf(),
            created_at: now,
            last_activity: now,
            config: SandboxConfig::default(),
        }))
    }

    #[tokio::test]
    async fn test_read_whole_file() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), "one\ntwo\nthree\n").unwrap();

        let output = ReadFileHandler
            .execute(
                test_workspace(temp.path()),
                serde_json::json!({"path": "a.txt"}),
            )
            .await
            .unwrap();
        assert!(output.content.contains("1\tone"));
        assert!(output.content.contains("3\tthree"));
        assert_eq!(output.metadata.unwrap()["totalLines"], 3);
    }

    #[tokio::test]
    async fn test_read_with_offset_and_limit() {
        let temp = tempdir().unwrap();
        let body: String = (1..=10).map(|i| format!("line{i}\n")).collect();
        std::fs::write(temp.path().join("b.txt"), body).unwrap();

        let output = ReadFileHandler
            .execute(
                test_workspace(temp.path()),
                serde_json::json!({"path": "b.txt", "offset": 4, "limit": 2}),
            )
            .await
            .unwrap();
        assert!(output.content.contains("line4"));
        assert!(output.content.contains("line5"));
        assert!(!output.content.contains("line6"));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp = tempdir().unwrap();
        let result = ReadFileHandler
            .execute(
                test_workspace(temp.path()),
                serde_json::json!({"path": "missing.txt"}),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_rejects_escape() {
        let temp = tempdir().unwrap();
        let result = ReadFileHandler
            .execute(
                test_workspace(temp.path()),
                serde_json::json!({"path": "../outside.txt"}),
            )
            .await;
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
    }
}
