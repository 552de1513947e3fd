// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Tool registry and handler trait.
//!
//! This module defines the core abstractions for the tool system:
//! - [`ToolHandler`] trait that all tools must implement
//! - [`ToolRegistry`] for managing and dispatching tool calls
//! - [`ToolOutput`] for returning results from tool execution
//!
//! Dispatch serializes mutating tools through the workspace mutation
//! lock and, when enabled, commits working-tree changes they produce.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "telemetry")]
use tracing::{debug, info_span, Instrument};

use crate::error::ToolError;
#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;
use crate::tools::commit;
use crate::workspace::Workspace;

/// JSON-schema-shaped description of a tool's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String, // Always "object"
    pub properties: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl InputSchema {
    /// Create a new input schema with object type.
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: None,
        }
    }

    /// Add a property to the schema.
    pub fn with_property(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark properties as required.
    pub fn with_required(mut self, required: Vec<String>) -> Self {
        self.required = Some(required);
        self
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Definition of a tool that can be called by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::new(),
        }
    }

    /// Set the input schema for this tool.
    pub fn with_schema(mut self, schema: InputSchema) -> Self {
        self.input_schema = schema;
        self
    }
}

/// Output from executing a tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: String,
    pub success: bool,
    pub metadata: Option<serde_json::Value>,
}

impl ToolOutput {
    /// Create a successful text output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
            metadata: None,
        }
    }

    /// Create an error text output.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: false,
            metadata: None,
        }
    }

    /// Attach structured metadata to the output.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Get a preview suitable for logging (truncated).
    pub fn log_preview(&self, max_bytes: usize) -> String {
        crate::tools::truncate_text(&self.content, max_bytes)
    }
}

impl From<ToolError> for ToolOutput {
    fn from(err: ToolError) -> Self {
        Self::error(err.to_string())
    }
}

/// Trait that all tool handlers must implement.
///
/// Handlers are stateless; the workspace they act on is passed per call
/// so one registry can serve many workspaces.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the tool definition (name, description, input schema).
    fn definition(&self) -> ToolDefinition;

    /// Returns true if this tool may mutate the workspace.
    ///
    /// Mutating tools are serialized through the workspace mutation lock
    /// and participate in auto-commit.
    fn is_mutating(&self) -> bool {
        false
    }

    /// Execute the tool against a workspace with the given input.
    async fn execute(
        &self,
        workspace: Arc<Workspace>,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError>;
}

/// Registry of available tools, maps names to handlers.
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    auto_commit: bool,
}

impl ToolRegistry {
    /// Create an empty registry with auto-commit enabled.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            auto_commit: true,
        }
    }

    /// Create a registry with the default workspace tools.
    pub fn with_defaults() -> Self {
        let mut builder = ToolRegistryBuilder::new();

        builder.register(super::handlers::BashHandler);
        builder.register(super::handlers::ReadFileHandler);
        builder.register(super::handlers::WriteFileHandler);
        builder.register(super::handlers::ListDirHandler);
        builder.register(super::handlers::GlobHandler);
        builder.register(super::handlers::SearchHandler);
        builder.register(super::handlers::GitStatusHandler);

        builder.build()
    }

    /// Create the default registry configured from loaded settings
    /// (currently the `autoCommit` flag).
    pub fn from_settings(settings: &crate::config::WorkspaceSettings) -> Self {
        let mut registry = Self::with_defaults();
        registry.auto_commit = settings.auto_commit;
        registry
    }

    /// Get a handler by tool name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Get all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.handlers.values().map(|h| h.definition()).collect()
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Dispatch a tool call against a workspace and return the result.
    ///
    /// Handler errors are folded into the [`DispatchResult`] rather than
    /// returned, so callers only see `Err` for unknown tool names or an
    /// inactive workspace. A mutating call holds the workspace mutation
    /// lock for the whole status → execute → status → commit sequence.
    pub async fn dispatch(
        &self,
        workspace: Arc<Workspace>,
        tool_name: &str,
        input: serde_json::Value,
    ) -> Result<DispatchResult, ToolError> {
        let handler = self
            .get(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;

        if !workspace.is_active() {
            return Err(ToolError::ExecutionFailed(
                "workspace is no longer active".to_string(),
            ));
        }

        #[cfg(feature = "telemetry")]
        debug!(tool = %tool_name, workspace = %workspace.id(), "Executing tool");

        let start = Instant::now();

        let result = if handler.is_mutating() {
            self.dispatch_mutating(&handler, &workspace, tool_name, input)
                .await
        } else {
            self.dispatch_readonly(&handler, &workspace, tool_name, input)
                .await
        };

        let duration = start.elapsed();

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_tool(tool_name, duration, result.is_ok());

        match result {
            Ok(output) => {
                #[cfg(feature = "telemetry")]
                debug!(
                    tool = %tool_name,
                    duration_ms = duration.as_secs_f64() * 1000.0,
                    "Tool execution succeeded"
                );
                Ok(DispatchResult {
                    tool_name: tool_name.to_string(),
                    output,
                    duration,
                    is_error: false,
                })
            }
            Err(err) => {
                #[cfg(feature = "telemetry")]
                debug!(
                    tool = %tool_name,
                    duration_ms = duration.as_secs_f64() * 1000.0,
                    error = %err,
                    "Tool execution failed"
                );
                Ok(DispatchResult {
                    tool_name: tool_name.to_string(),
                    output: ToolOutput::from(err),
                    duration,
                    is_error: true,
                })
            }
        }
    }

    async fn dispatch_readonly(
        &self,
        handler: &Arc<dyn ToolHandler>,
        workspace: &Arc<Workspace>,
        _tool_name: &str,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        #[cfg(feature = "telemetry")]
        {
            handler
                .execute(Arc::clone(workspace), input)
                .instrument(info_span!("tool_execute", tool = %_tool_name))
                .await
        }
        #[cfg(not(feature = "telemetry"))]
        {
            handler.execute(Arc::clone(workspace), input).await
        }
    }

    async fn dispatch_mutating(
        &self,
        handler: &Arc<dyn ToolHandler>,
        workspace: &Arc<Workspace>,
        tool_name: &str,
        input: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let _guard = workspace.mutation_lock().lock().await;

        let pre_status = if self.auto_commit {
            commit::capture_status(workspace.git()).await
        } else {
            None
        };

        let output = self
            .dispatch_readonly(handler, workspace, tool_name, input)
            .await?;

        // Commit only follows a successful mutation
        if !self.auto_commit || !output.success {
            return Ok(output);
        }

        match commit::commit_if_changed(workspace.git(), pre_status.as_ref(), tool_name).await {
            Some(hash) => {
                let metadata = match output.metadata.clone() {
                    Some(serde_json::Value::Object(mut map)) => {
                        map.insert(
                            "commitHash".to_string(),
                            serde_json::Value::String(hash.clone()),
                        );
                        serde_json::Value::Object(map)
                    }
                    _ => serde_json::json!({ "commitHash": hash }),
                };
                Ok(output.with_metadata(metadata))
            }
            None => Ok(output),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of dispatching a tool call.
#[derive(Debug)]
pub struct DispatchResult {
    /// Name of the tool that was called
    pub tool_name: String,
    /// Output from the tool
    pub output: ToolOutput,
    /// Duration of execution
    pub duration: Duration,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

/// Builder for constructing a ToolRegistry.
pub struct ToolRegistryBuilder {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    auto_commit: bool,
}

impl ToolRegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            auto_commit: true,
        }
    }

    /// Register a tool handler.
    pub fn register<T: ToolHandler + 'static>(&mut self, handler: T) -> &mut Self {
        let def = handler.definition();
        self.handlers.insert(def.name.clone(), Arc::new(handler));
        self
    }

    /// Register a tool handler (boxed version for dynamic registration).
    pub fn register_boxed(&mut self, handler: Arc<dyn ToolHandler>) -> &mut Self {
        let def = handler.definition();
        self.handlers.insert(def.name.clone(), handler);
        self
    }

    /// Enable or disable auto-commit for mutating tools.
    pub fn auto_commit(&mut self, enabled: bool) -> &mut Self {
        self.auto_commit = enabled;
        self
    }

    /// Build the final registry.
    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            handlers: self.handlers,
            auto_commit: self.auto_commit,
        }
    }
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
