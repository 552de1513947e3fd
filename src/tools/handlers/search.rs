// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Search tool handler.
//!
//! Regex search over workspace files, with an optional glob filter on
//! file names. Binary files (anything that fails UTF-8 decoding) are
//! skipped.

use std::sync::Arc;

use async_trait::async_trait;
use globset::Glob;
use regex::RegexBuilder;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::tools::{parse_arguments, truncate_text, MAX_LINE_LENGTH};
use crate::workspace::Workspace;

/// Handler for the `search` tool.
pub struct SearchHandler;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 2000;

/// Arguments for the search tool.
#[derive(Debug, Deserialize)]
struct SearchArgs {
    /// Regular expression pattern to search for.
    pattern: String,

    /// Optional glob pattern to filter files (e.g. `*.rs`).
    #[serde(default)]
    glob: Option<String>,

    /// Workspace-relative directory to search in.
    #[serde(default)]
    path: Option<String>,

    /// Maximum number of matching lines to return.
    #[serde(default = "default_limit")]
    limit: usize,

    /// Case insensitive search.
    #[serde(default)]
    case_insensitive: bool,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[async_trait]
impl ToolHandler for SearchHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("search", "Search workspace files for a regex pattern").with_schema(
            InputSchema::new()
                .with_property(
                    "pattern",
                    serde_json::json!({
                        "type": "string",
                        "description": "Regular expression pattern to search for"
                    }),
                )
                .with_property(
                    "glob",
                    serde_json::json!({
                        "type": "string",
                        "description": "Glob pattern to filter file names (e.g. '*.rs')"
                    }),
                )
                .with_property(
                    "path",
                    serde_json::json!({
                        "type": "string",
                        "description": "Workspace-relative directory to search in"
                    }),
                )
                .with_property(
                    "limit",
                    serde_json::json!({
                        "type": "integer",
                        "description": "Maximum number of matching lines (default: 100, max: 2000)"
                    }),
                )
                .with_property(
                    "case_insensitive",
                    serde_json::json!({
                        "type": "boolean",
                        "description": "Case insensitive search"
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
        let args: SearchArgs = parse_arguments(&input)?;

        let regex = RegexBuilder::new(&args.pattern)
            .case_insensitive(args.case_insensitive)
            .build()
            .map_err(|err| ToolError::InvalidInput(format!("Invalid pattern: {err}")))?;

        let name_filter = match &args.glob {
            Some(pattern) => Some(
                Glob::new(pattern)
                    .map_err(|err| ToolError::InvalidInput(format!("Invalid glob: {err}")))?
                    .compile_matcher(),
            ),
            None => None,
        };

        let root = workspace.root().to_path_buf();
        let search_dir = workspace
            .fs()
            .resolve_path(args.path.as_deref().unwrap_or("."))?;
        let limit = args.limit.clamp(1, MAX_LIMIT);

        // Traversal and matching are blocking work
        let result = tokio::task::spawn_blocking(move || {
            let mut lines = Vec::new();
            let mut truncated = false;

            'files: for entry in WalkDir::new(&search_dir)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if let Some(matcher) = &name_filter {
                    if !matcher.is_match(entry.file_name()) {
                        continue;
                    }
                }

                let Ok(content) = std::fs::read_to_string(entry.path()) else {
                    continue; // binary or unreadable
                };

                let display = entry
                    .path()
                    .strip_prefix(&root)
                    .unwrap_or(entry.path())
                    .display()
                    .to_string();

                for (idx, line) in content.lines().enumerate() {
                    if regex.is_match(line) {
                        if lines.len() >= limit {
                            truncated = true;
                            break 'files;
                        }
                        let line = truncate_text(line, MAX_LINE_LENGTH);
                        lines.push(format!("{display}:{}:{line}", idx + 1));
                    }
                }
            }

            (lines, truncated)
        })
        .await
        .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let (lines, truncated) = result;
        let metadata = serde_json::json!({
            "pattern": args.pattern,
            "matches": lines.len(),
            "truncated": truncated,
        });

        let mut content = lines.join("\n");
        if truncated {
            content.push_str("\n... [result limit reached]");
        }

        Ok(ToolOutput::success(content).with_metadata(metadata))
    }
}
