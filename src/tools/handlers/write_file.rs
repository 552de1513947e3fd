// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Write-file tool handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::tools::parse_arguments;
use crate::workspace::Workspace;

/// Handler for the `write_file` tool.
pub struct WriteFileHandler;

/// Arguments for the write_file tool.
#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    /// Workspace-relative path to write.
    path: String,

    /// Content to write.
    content: String,

    /// Create missing parent directories (default: true).
    #[serde(default = "default_create_dirs")]
    create_dirs: bool,
}

fn default_create_dirs() -> bool {
    true
}

#[async_trait]
impl ToolHandler for WriteFileHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("write_file", "Write a file in the workspace").with_schema(
            InputSchema::new()
                .with_property(
                    "path",
                    serde_json::json!({
                        "type": "string",
                        "description": "Workspace-relative path to the file"
                    }),
                )
                .with_property(
                    "content",
                    serde_json::json!({
                        "type": "string",
                        "description": "Content to write"
                    }),
                )
                .with_property(
                    "create_dirs",
                    serde_json::json!({
                        "type": "boolean",
                        "description": "Create missing parent directories (default: true)"
                    }),
                )
                .with_required(vec!["path".to_string(), "content".to_string()]),
        )
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let args: WriteFileArgs = parse_arguments(&input)?;

        let existed = workspace.fs().exists(&args.path).await?;
        workspace
            .fs()
            .write_file(&args.path, &args.content, args.create_dirs)
            .await?;

        let metadata = serde_json::json!({
            "path": args.path,
            "bytes": args.content.len(),
            "created": !existed,
        });

        let verb = if existed { "Updated" } else { "Created" };
        Ok(ToolOutput::success(format!("{verb} {}", args.path)).with_metadata(metadata))
    }
}
