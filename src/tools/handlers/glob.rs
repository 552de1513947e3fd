// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Glob tool handler.
//!
//! Pattern search over the workspace tree, capped and sorted by
//! modification time so the most recently touched files come first.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ToolError;
use crate::fs::GLOB_LIMIT;
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::tools::parse_arguments;
use crate::workspace::Workspace;

/// Handler for the `glob` tool.
pub struct GlobHandler;

/// Arguments for the glob tool.
#[derive(Debug, Deserialize)]
struct GlobArgs {
    /// Glob pattern, e.g. `src/**/*.rs`.
    pattern: String,
}

#[async_trait]
impl ToolHandler for GlobHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("glob", "Find workspace files matching a glob pattern").with_schema(
            InputSchema::new()
                .with_property(
                    "pattern",
                    serde_json::json!({
                        "type": "string",
                        "description": "Glob pattern, e.g. src/**/*.rs"
                    }),
                )
                .with_required(vec!["pattern".to_string()]),
        )
    }

    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let args: GlobArgs = parse_arguments(&input)?;

        let result = workspace.fs().glob(&args.pattern).await?;

        let mut lines: Vec<String> = result
            .entries
            .iter()
            .map(|entry| entry.path.display().to_string())
            .collect();
        if result.truncated {
            lines.push(format!("... [capped at {GLOB_LIMIT} matches]"));
        }

        let metadata = serde_json::json!({
            "pattern": args.pattern,
            "count": result.entries.len(),
            "truncated": result.truncated,
        });

        Ok(ToolOutput::success(lines.join("\n")).with_metadata(metadata))
    }
}
