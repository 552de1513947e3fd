// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Streaming execution protocol.
//!
//! Every tool invocation is observable as an event stream with a fixed
//! shape: exactly one [`ToolEvent::Pending`] as soon as the call is
//! accepted, then exactly one terminal event, [`ToolEvent::Done`] or
//! [`ToolEvent::Error`]. Handler errors, dispatch errors, and panics in
//! the handler all surface as an `Error` event; the stream never ends
//! without a terminal event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[cfg(feature = "telemetry")]
use tracing::error;

use crate::tools::registry::ToolRegistry;
use crate::workspace::Workspace;

/// Event channel depth, enough for one invocation's pending and
/// terminal events without blocking the executor on a slow consumer.
const CHANNEL_CAPACITY: usize = 8;

/// Error payload of a failed invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolEventError {
    pub message: String,
}

/// One event in a tool invocation stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ToolEvent {
    /// The invocation was accepted and is running.
    #[serde(rename_all = "camelCase")]
    Pending {
        prompt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// The invocation finished successfully.
    #[serde(rename_all = "camelCase")]
    Done {
        prompt: String,
        metadata: serde_json::Value,
    },
    /// The invocation failed.
    #[serde(rename_all = "camelCase")]
    Error {
        prompt: String,
        error: ToolEventError,
    },
}

impl ToolEvent {
    /// Whether this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

/// Run a tool and stream its lifecycle events.
///
/// The returned receiver yields the pending event, then the terminal
/// event, then closes. Dropping the receiver does not cancel the
/// invocation; a mutating tool still completes its commit sequence.
pub fn run_tool(
    registry: Arc<ToolRegistry>,
    workspace: Arc<Workspace>,
    tool_name: impl Into<String>,
    input: serde_json::Value,
    prompt: impl Into<String>,
) -> mpsc::Receiver<ToolEvent> {
    let tool_name = tool_name.into();
    let prompt = prompt.into();
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let _ = tx
            .send(ToolEvent::Pending {
                prompt: prompt.clone(),
                metadata: None,
            })
            .await;

        let terminal = execute_guarded(registry, workspace, &tool_name, input, &prompt).await;
        let _ = tx.send(terminal).await;
    });

    rx
}

/// Dispatch the tool, converting every failure mode into an event.
async fn execute_guarded(
    registry: Arc<ToolRegistry>,
    workspace: Arc<Workspace>,
    tool_name: &str,
    input: serde_json::Value,
    prompt: &str,
) -> ToolEvent {
    let name = tool_name.to_string();
    let handle =
        tokio::spawn(async move { registry.dispatch(workspace, &name, input).await });

    let result = match handle.await {
        Ok(result) => result,
        Err(join_err) => {
            // A panicking handler must still terminate the stream
            #[cfg(feature = "telemetry")]
            error!(tool = %tool_name, error = %join_err, "Tool task aborted");
            return ToolEvent::Error {
                prompt: prompt.to_string(),
                error: ToolEventError {
                    message: format!("tool task aborted: {join_err}"),
                },
            };
        }
    };

    match result {
        Ok(dispatch) if !dispatch.is_error && dispatch.output.success => {
            let mut metadata = dispatch
                .output
                .metadata
                .clone()
                .unwrap_or_else(|| serde_json::json!({}));
            if let serde_json::Value::Object(ref mut map) = metadata {
                map.insert(
                    "content".to_string(),
                    serde_json::Value::String(dispatch.output.content.clone()),
                );
                map.insert(
                    "durationMs".to_string(),
                    serde_json::json!(dispatch.duration.as_millis() as u64),
                );
            }
            ToolEvent::Done {
                prompt: prompt.to_string(),
                metadata,
            }
        }
        Ok(dispatch) => ToolEvent::Error {
            prompt: prompt.to_string(),
            error: ToolEventError {
                message: dispatch.output.content,
            },
        },
        Err(err) => ToolEvent::Error {
            prompt: prompt.to_string(),
            error: ToolEventError {
                message: err.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tools::registry::{
        ToolDefinition, ToolHandler, ToolOutput, ToolRegistryBuilder,
    };
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct OkTool;

    #[async_trait]
    impl ToolHandler for OkTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("ok", "Succeeds")
        }

        async fn execute(
            &self,
            _workspace: Arc<Workspace>,
            _input: serde_json::Value,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::success("done"))
        }
    }

    struct PanicTool;

    #[async_trait]
    impl ToolHandler for PanicTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("panic", "Panics")
        }

        async fn execute(
            &self,
            _workspace: Arc<Workspace>,
            _input: serde_json::Value,
        ) -> Result<ToolOutput, ToolError> {
            panic!("handler bug");
        }
    }

    fn test_workspace(root: &std::path::Path) -> Arc<Workspace> {
        let now = chrono::Utc::now();
        Arc::new(Workspace::new(crate::sandbox::SandboxInstance {
            id: "stream-test".to_string(),
            active: true,
            root: root.to_path_buf(),
            created_at: now,
            last_activity: now,
            config: crate::config::SandboxConfig::default(),
        }))
    }

    async fn collect(mut rx: mpsc::Receiver<ToolEvent>) -> Vec<ToolEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_success_emits_pending_then_done() {
        let temp = tempdir().unwrap();
        let mut builder = ToolRegistryBuilder::new();
        builder.register(OkTool);
        let registry = Arc::new(builder.build());

        let rx = run_tool(
            registry,
            test_workspace(temp.path()),
            "ok",
            serde_json::json!({}),
            "run the ok tool",
        );
        let events = collect(rx).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ToolEvent::Pending { .. }));
        match &events[1] {
            ToolEvent::Done { prompt, metadata } => {
                assert_eq!(prompt, "run the ok tool");
                assert_eq!(metadata["content"], "done");
            }
            other => panic!("expected done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_emits_error() {
        let temp = tempdir().unwrap();
        let registry = Arc::new(ToolRegistryBuilder::new().build());

        let rx = run_tool(
            registry,
            test_workspace(temp.path()),
            "missing",
            serde_json::json!({}),
            "call a missing tool",
        );
        let events = collect(rx).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ToolEvent::Pending { .. }));
        assert!(matches!(events[1], ToolEvent::Error { .. }));
    }

    #[tokio::test]
    async fn test_panicking_handler_still_terminates() {
        let temp = tempdir().unwrap();
        let mut builder = ToolRegistryBuilder::new();
        builder.register(PanicTool);
        let registry = Arc::new(builder.build());

        let rx = run_tool(
            registry,
            test_workspace(temp.path()),
            "panic",
            serde_json::json!({}),
            "trigger a panic",
        );
        let events = collect(rx).await;

        assert_eq!(events.len(), 2);
        match &events[1] {
            ToolEvent::Error { error, .. } => {
                assert!(error.message.contains("aborted"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = ToolEvent::Error {
            prompt: "p".to_string(),
            error: ToolEventError {
                message: "m".to_string(),
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["message"], "m");

        let pending = ToolEvent::Pending {
            prompt: "p".to_string(),
            metadata: None,
        };
        let value = serde_json::to_value(&pending).unwrap();
        assert_eq!(value["status"], "pending");
        assert!(value.get("metadata").is_none());
    }
}
