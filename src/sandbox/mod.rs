// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Sandbox provider boundary.
//!
//! A [`SandboxProvider`] owns the point-to-point lifecycle of isolated
//! execution environments: create, connect, kill, list. The rest of the
//! crate treats an instance as opaque beyond its id, root path, timeout,
//! and metadata. Two implementations ship here: a local process sandbox
//! rooted in a directory, and an HTTP client for a cloud sandbox service.

mod local;
mod remote;

pub use local::LocalSandbox;
pub use remote::RemoteSandboxClient;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SandboxConfig;
use crate::error::WorkspaceError;

/// One sandbox instance as reported by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxInstance {
    /// Provider-assigned identity.
    pub id: String,

    /// Whether the provider considers the instance running.
    pub active: bool,

    /// Directory the workspace adapters bind to. For the local provider
    /// this is a directory on disk; for a remote provider it is the
    /// instance's mounted workspace path.
    pub root: PathBuf,

    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,

    /// Configuration the instance was created with.
    pub config: SandboxConfig,
}

impl SandboxInstance {
    /// Seconds since the instance was created.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }
}

/// Lifecycle operations against a sandbox backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Create a fresh instance.
    async fn create(&self, config: &SandboxConfig) -> Result<SandboxInstance, WorkspaceError>;

    /// Attach to an existing instance by id.
    async fn connect(&self, id: &str) -> Result<SandboxInstance, WorkspaceError>;

    /// Tear an instance down. Killing an unknown id is an error.
    async fn kill(&self, id: &str) -> Result<(), WorkspaceError>;

    /// List instances known to the provider.
    async fn list(&self) -> Result<Vec<SandboxInstance>, WorkspaceError>;
}
