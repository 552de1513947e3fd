// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Bash tool handler.
//!
//! Executes shell commands inside the workspace with timeout support.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument, warn};

use crate::error::ToolError;
use crate::shell::{ExecRequest, DEFAULT_TIMEOUT_MS};
use crate::tools::registry::{InputSchema, ToolDefinition, ToolHandler, ToolOutput};
use crate::tools::{parse_arguments, truncate_output, truncate_text};
use crate::workspace::Workspace;

/// Handler for the `bash` tool.
pub struct BashHandler;

const MAX_OUTPUT_LINES: usize = 500;

/// Arguments for the bash tool.
#[derive(Debug, Deserialize)]
struct BashArgs {
    /// The command to execute.
    command: String,

    /// Timeout in milliseconds (default: 120000, max: 600000).
    #[serde(default = "default_timeout")]
    timeout: u64,

    /// Optional description of what the command does.
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[async_trait]
impl ToolHandler for BashHandler {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("bash", "Execute a bash command in the workspace").with_schema(
            InputSchema::new()
                .with_property(
                    "command",
                    serde_json::json!({
                        "type": "string",
                        "description": "The bash command to execute"
                    }),
                )
                .with_property(
                    "timeout",
                    serde_json::json!({
                        "type": "integer",
                        "description": "Timeout in milliseconds (default: 120000, max: 600000)"
                    }),
                )
                .with_property(
                    "description",
                    serde_json::json!({
                        "type": "string",
                        "description": "Description of what the command does"
                    }),
                )
                .with_required(vec!["command".to_string()]),
        )
    }

    fn is_mutating(&self) -> bool {
        true // Shell commands can modify the workspace
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(skip(self, workspace, input), fields(command, timeout_ms, exit_code))
    )]
    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let args: BashArgs = parse_arguments(&input)?;

        #[cfg(feature = "telemetry")]
        let cmd_preview = truncate_text(&args.command, 100);

        #[cfg(feature = "telemetry")]
        {
            let span = tracing::Span::current();
            span.record("command", cmd_preview.as_str());
            span.record("timeout_ms", args.timeout);
        }

        let request = ExecRequest::new(&args.command).with_timeout_ms(args.timeout);
        let result = workspace.bash().exec(&request).await?;

        #[cfg(feature = "telemetry")]
        {
            tracing::Span::current().record("exit_code", result.exit_code);
            if result.timed_out {
                warn!(command = %cmd_preview, "Command timed out");
            } else {
                debug!(command = %cmd_preview, exit_code = result.exit_code, "Command finished");
            }
        }

        let metadata = serde_json::json!({
            "exitCode": result.exit_code,
            "timedOut": result.timed_out,
            "durationMs": result.duration.as_millis() as u64,
        });

        let content = truncate_output(&result.combined_output(), MAX_OUTPUT_LINES);

        if result.timed_out {
            return Ok(ToolOutput::error(format!(
                "Command timed out after {} ms\n{content}",
                args.timeout
            ))
            .with_metadata(metadata));
        }

        if result.success() {
            Ok(ToolOutput::success(content).with_metadata(metadata))
        } else {
            Ok(ToolOutput::error(format!(
                "Command exited with code {}\n{content}",
                result.exit_code
            ))
            .with_metadata(metadata))
        }
    }
}
