// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Git status tool handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::workspace::Workspace;

/// Handler for the `git_status` tool.
pub struct GitStatusHandler;

#[async_trait]
impl ToolHandler for GitStatusHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("git_status", "Report the git status of the workspace")
            .with_schema(InputSchema::new())
    }

    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        _input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let status = workspace.git().status().await?;

        let mut lines = vec![format!("On branch {}", status.branch)];
        if let Some(ahead) = status.ahead.filter(|n| *n > 0) {
            lines.push(format!("Ahead of upstream by {ahead}"));
        }
        if let Some(behind) = status.behind.filter(|n| *n > 0) {
            lines.push(format!("Behind upstream by {behind}"));
        }
        if status.clean {
            lines.push("Working tree clean".to_string());
        } else {
            for path in &status.staged {
                lines.push(format!("staged:    {path}"));
            }
            for path in &status.modified {
                lines.push(format!("modified:  {path}"));
            }
            for path in &status.deleted {
                lines.push(format!("deleted:   {path}"));
            }
            for rename in &status.renamed {
                lines.push(format!("renamed:   {} -> {}", rename.from, rename.to));
            }
            for path in &status.untracked {
                lines.push(format!("untracked: {path}"));
            }
        }

        let metadata = serde_json::to_value(&status)
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        Ok(ToolOutput::success(lines.join("\n")).with_metadata(metadata))
    }
}
