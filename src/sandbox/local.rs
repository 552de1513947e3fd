// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Local process sandbox.
//!
//! Instances are subdirectories of a base directory; isolation is by
//! working-directory scoping only. This is the default backend for tests
//! and local development, and the reference implementation of the
//! provider contract.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[cfg(feature = "telemetry")]
use tracing::{debug, warn};

use crate::config::SandboxConfig;
use crate::error::WorkspaceError;

use super::{SandboxInstance, SandboxProvider};

/// Sandbox provider backed by directories under a base path.
pub struct LocalSandbox {
    base_dir: PathBuf,
    instances: Mutex<HashMap<String, SandboxInstance>>,
}

impl LocalSandbox {
    /// Create a provider whose instances live under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    fn instance_root(&self, id: &str) -> PathBuf {
        self.base_dir.join(id)
    }
}

#[async_trait]
impl SandboxProvider for LocalSandbox {
    async fn create(&self, config: &SandboxConfig) -> Result<SandboxInstance, WorkspaceError> {
        let id = Uuid::new_v4().to_string();
        let root = self.instance_root(&id);

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| WorkspaceError::CreationFailed(e.to_string()))?;

        let now = Utc::now();
        let instance = SandboxInstance {
            id: id.clone(),
            active: true,
            root,
            created_at: now,
            last_activity: now,
            config: config.clone(),
        };

        #[cfg(feature = "telemetry")]
        debug!(id = %id, "Local sandbox created");

        self.instances.lock().await.insert(id, instance.clone());
        Ok(instance)
    }

    async fn connect(&self, id: &str) -> Result<SandboxInstance, WorkspaceError> {
        let mut instances = self.instances.lock().await;

        if let Some(instance) = instances.get_mut(id) {
            instance.last_activity = Utc::now();
            return Ok(instance.clone());
        }

        // Not in this process's registry; the directory may survive from
        // an earlier run.
        let root = self.instance_root(id);
        if root.is_dir() {
            let now = Utc::now();
            let instance = SandboxInstance {
                id: id.to_string(),
                active: true,
                root,
                created_at: now,
                last_activity: now,
                config: SandboxConfig::default(),
            };
            instances.insert(id.to_string(), instance.clone());
            return Ok(instance);
        }

        Err(WorkspaceError::NotFound(id.to_string()))
    }

    async fn kill(&self, id: &str) -> Result<(), WorkspaceError> {
        let removed = self.instances.lock().await.remove(id);
        let root = self.instance_root(id);

        if removed.is_none() && !root.exists() {
            return Err(WorkspaceError::NotFound(id.to_string()));
        }

        if root.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&root).await {
                #[cfg(feature = "telemetry")]
                warn!(id = %id, error = %e, "Failed to remove sandbox directory");
                return Err(WorkspaceError::Provider(e.to_string()));
            }
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<SandboxInstance>, WorkspaceError> {
        Ok(self.instances.lock().await.values().cloned().collect())
    }
}
