// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Tool system over workspaces.
//!
//! Tools are the agent-facing surface of the crate: each one is a struct
//! implementing [`ToolHandler`], registered by name in a
//! [`ToolRegistry`], and dispatched against a live
//! [`Workspace`](crate::workspace::Workspace).
//!
//! Dispatch adds two behaviors on top of the raw handlers:
//!
//! - mutating tools run under the workspace's mutation lock, and
//! - when auto-commit is enabled, a mutating call that changed the git
//!   working tree is committed and the commit hash attached to the
//!   result metadata.
//!
//! The [`stream`] module wraps dispatch in the event protocol consumers
//! observe: exactly one `pending` event followed by exactly one `done`
//! or `error` event per invocation.

pub mod commit;
pub mod handlers;
pub mod registry;
pub mod stream;

pub use handlers::*;
pub use registry::{
    DispatchResult, InputSchema, ToolDefinition, ToolHandler, ToolOutput, ToolRegistry,
    ToolRegistryBuilder,
};
pub use stream::{run_tool, ToolEvent};

use serde::Deserialize;

use crate::error::ToolError;

/// Parse JSON arguments into a typed struct.
pub fn parse_arguments<T>(arguments: &serde_json::Value) -> Result<T, ToolError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(arguments.clone())
        .map_err(|err| ToolError::InvalidInput(format!("Failed to parse arguments: {err}")))
}

/// Default limit for file reading operations, in lines.
pub const DEFAULT_READ_LIMIT: usize = 2000;

/// Maximum line length before truncation.
pub const MAX_LINE_LENGTH: usize = 2000;

/// Truncate text to a maximum byte length, respecting UTF-8 boundaries.
pub fn truncate_text(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }

    if end == 0 {
        return String::new();
    }

    format!("{}... [truncated]", &text[..end])
}

/// Truncate output by lines, keeping first and last portions.
pub fn truncate_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let total = lines.len();

    if total <= max_lines {
        return output.to_string();
    }

    let keep = max_lines / 2;
    let first_part: Vec<&str> = lines.iter().take(keep).copied().collect();
    let last_part: Vec<&str> = lines.iter().skip(total - keep).copied().collect();
    let omitted = total - max_lines;

    format!(
        "{}\n\n... [{omitted} lines omitted] ...\n\n{}",
        first_part.join("\n"),
        last_part.join("\n")
    )
}
