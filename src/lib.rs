// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Cradle - sandboxed execution workspaces for autonomous agents.
//!
//! A workspace bundles a filesystem, shell, and git surface bound to one
//! sandbox instance, local or remote. Liveness of remote instances is
//! tracked with expiring heartbeat leases in a shared key-value store,
//! so reconnecting to an existing sandbox and creating a fresh one are
//! the same call. Tools execute against workspaces through a registry
//! with a streaming event protocol and optional auto-commit of the
//! changes they make.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`error`] - Error types and result alias
//! - [`config`] - Sandbox and workspace configuration, file loading
//! - [`telemetry`] - Tracing, metrics, and observability infrastructure
//! - [`lease`] - Heartbeat leases and the key-value store boundary
//! - [`sandbox`] - Sandbox providers (local directories, remote HTTP)
//! - [`workspace`] - Workspace contract, lifecycle manager, resolver cache
//! - [`fs`] - Path-scoped filesystem adapter with glob and watching
//! - [`shell`] - Command execution with timeouts and output capping
//! - [`git`] - Version control adapter over the git CLI
//! - [`tools`] - Tool handlers, registry, and the event stream protocol
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cradle::config::{LivenessPolicy, SandboxConfig};
//! use cradle::lease::MemoryLeaseStore;
//! use cradle::sandbox::LocalSandbox;
//! use cradle::workspace::WorkspaceManager;
//!
//! let manager = WorkspaceManager::new(
//!     Arc::new(LocalSandbox::new("/tmp/sandboxes")),
//!     Arc::new(MemoryLeaseStore::new()),
//!     SandboxConfig::default(),
//!     LivenessPolicy::Lazy,
//! );
//! let workspace = manager.connect_or_create(None).await?;
//! workspace.git().init().await?;
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod lease;
pub mod sandbox;
pub mod shell;
pub mod telemetry;
pub mod tools;
pub mod workspace;

// Re-export commonly used types at crate root
pub use config::{LivenessPolicy, SandboxConfig, WorkspaceSettings};
pub use error::{ConfigError, GitError, LeaseError, Result, ToolError, WorkspaceError};
pub use lease::{HeartbeatLease, LeaseStore, MemoryLeaseStore};
pub use sandbox::{LocalSandbox, RemoteSandboxClient, SandboxInstance, SandboxProvider};
pub use tools::{
    run_tool, ToolDefinition, ToolEvent, ToolHandler, ToolOutput, ToolRegistry,
    ToolRegistryBuilder,
};
pub use workspace::{Workspace, WorkspaceManager, WorkspaceResolver, WorkspaceStatus};

/// Cradle version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
