// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Workspace lifecycle manager.
//!
//! Drives one workspace through `Uninitialized → Connecting → Active →
//! Stopped` (a new cycle may start from `Stopped`). Reconnect failures
//! degrade silently to fresh creation; creation failures propagate since
//! there is no more-degraded fallback. Liveness is checked against the
//! heartbeat lease, never by polling the provider.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;

use crate::config::{LivenessPolicy, SandboxConfig, WorkspaceSettings};
use crate::error::WorkspaceError;
use crate::lease::{HeartbeatLease, LeaseStore};
use crate::sandbox::{LocalSandbox, RemoteSandboxClient, SandboxProvider};

use super::Workspace;

/// Lifecycle phase of the managed workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Connecting,
    Active,
    Stopped,
}

struct ManagerState {
    phase: Phase,
    workspace: Option<Arc<Workspace>>,
    lease: Option<HeartbeatLease>,
    last_id: Option<String>,
    refresh_task: Option<JoinHandle<()>>,
}

/// Snapshot of the managed workspace's state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatus {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    /// Active and the lease is still alive, so the instance can be
    /// resumed without recreation.
    pub reusable: bool,
}

/// Manages creation, reconnection, and teardown of one workspace.
pub struct WorkspaceManager {
    provider: Arc<dyn SandboxProvider>,
    store: Arc<dyn LeaseStore>,
    config: Mutex<SandboxConfig>,
    liveness: LivenessPolicy,
    state: Mutex<ManagerState>,
}

impl WorkspaceManager {
    /// Create a manager over a provider and lease store.
    pub fn new(
        provider: Arc<dyn SandboxProvider>,
        store: Arc<dyn LeaseStore>,
        config: SandboxConfig,
        liveness: LivenessPolicy,
    ) -> Self {
        Self {
            provider,
            store,
            config: Mutex::new(config),
            liveness,
            state: Mutex::new(ManagerState {
                phase: Phase::Uninitialized,
                workspace: None,
                lease: None,
                last_id: None,
                refresh_task: None,
            }),
        }
    }

    /// Create a manager from loaded [`WorkspaceSettings`].
    ///
    /// `remoteBaseUrl` selects the remote sandbox service; without it,
    /// sandboxes are local directories under `local_base`.
    pub fn from_settings(
        settings: &WorkspaceSettings,
        store: Arc<dyn LeaseStore>,
        local_base: impl Into<std::path::PathBuf>,
    ) -> Self {
        let provider: Arc<dyn SandboxProvider> = match &settings.remote_base_url {
            Some(url) => Arc::new(RemoteSandboxClient::new(url.clone(), None)),
            None => Arc::new(LocalSandbox::new(local_base)),
        };

        Self::new(
            provider,
            store,
            settings.sandbox.clone(),
            settings.liveness.clone(),
        )
    }

    /// Reconnect to `sandbox_id` (or the last-used id) when its lease is
    /// alive, otherwise create a fresh instance.
    ///
    /// Always returns an active workspace; the only error path is
    /// creation itself failing.
    pub async fn connect_or_create(
        &self,
        sandbox_id: Option<&str>,
    ) -> Result<Arc<Workspace>, WorkspaceError> {
        let candidate = {
            let state = self.state.lock().await;
            sandbox_id
                .map(str::to_string)
                .or_else(|| state.last_id.clone())
        };

        if let Some(id) = candidate {
            if crate::lease::is_alive(&self.store, &id).await {
                match self.connect(&id).await {
                    Ok(workspace) => return Ok(workspace),
                    Err(err) => {
                        // Reconnect failure is not fatal; fall through to
                        // a fresh instance.
                        warn!(id = %id, error = %err, "Reconnect failed, creating a fresh sandbox");
                    }
                }
            } else {
                info!(id = %id, "Heartbeat lease absent or expired, creating a fresh sandbox");
            }
        }

        self.force_create().await
    }

    /// Create a new instance unconditionally, ignoring any existing id.
    pub async fn force_create(&self) -> Result<Arc<Workspace>, WorkspaceError> {
        #[cfg(feature = "telemetry")]
        let start = std::time::Instant::now();

        {
            let mut state = self.state.lock().await;
            state.phase = Phase::Connecting;
        }

        let config = self.config.lock().await.clone();
        let instance = match self.provider.create(&config).await {
            Ok(instance) => instance,
            Err(err) => {
                self.state.lock().await.phase = Phase::Stopped;
                return Err(err);
            }
        };

        let lease = HeartbeatLease::new(Arc::clone(&self.store), &instance.id, config.lease_ttl());
        if let Err(err) = lease.refresh().await {
            warn!(error = %err, "Failed to write heartbeat lease for new sandbox");
        }

        let workspace = Arc::new(Workspace::new(instance));
        self.install(workspace.clone(), lease).await;

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_operation("workspace.create", start.elapsed());

        info!(id = %workspace.id(), "Workspace created");
        Ok(workspace)
    }

    /// Attach to an existing instance by id, rebinding the adapters and
    /// refreshing the lease.
    pub async fn connect(&self, id: &str) -> Result<Arc<Workspace>, WorkspaceError> {
        #[cfg(feature = "telemetry")]
        let start = std::time::Instant::now();

        {
            let mut state = self.state.lock().await;
            state.phase = Phase::Connecting;
        }

        let instance = match self.provider.connect(id).await {
            Ok(instance) => instance,
            Err(err) => {
                self.state.lock().await.phase = Phase::Stopped;
                return Err(err);
            }
        };

        let config = self.config.lock().await.clone();
        let lease = HeartbeatLease::new(Arc::clone(&self.store), &instance.id, config.lease_ttl());
        if let Err(err) = lease.refresh().await {
            warn!(error = %err, "Failed to refresh heartbeat lease on reconnect");
        }

        let workspace = Arc::new(Workspace::new(instance));
        self.install(workspace.clone(), lease).await;

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_operation("workspace.connect", start.elapsed());

        info!(id = %workspace.id(), "Workspace reconnected");
        Ok(workspace)
    }

    /// Best-effort teardown: kill the remote instance (failure logged,
    /// not propagated), clear the lease, and reset to `Stopped`.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;

        if let Some(task) = state.refresh_task.take() {
            task.abort();
        }

        if let Some(workspace) = state.workspace.take() {
            workspace.deactivate();
            if let Err(err) = self.provider.kill(workspace.id()).await {
                warn!(id = %workspace.id(), error = %err, "Sandbox teardown failed");
            }
        }

        if let Some(lease) = state.lease.take() {
            if let Err(err) = lease.clear().await {
                warn!(error = %err, "Failed to clear heartbeat lease");
            }
        }

        state.phase = Phase::Stopped;
    }

    /// Merge new configuration, stop the current instance, and recreate.
    pub async fn refresh(
        &self,
        config: Option<SandboxConfig>,
    ) -> Result<Arc<Workspace>, WorkspaceError> {
        if let Some(overlay) = config {
            let mut current = self.config.lock().await;
            *current = current.merged_with(&overlay);
        }

        self.stop().await;
        self.force_create().await
    }

    /// Report the current lifecycle state.
    pub async fn status(&self) -> WorkspaceStatus {
        let (active, workspace, lease) = {
            let state = self.state.lock().await;
            (
                state.phase == Phase::Active,
                state.workspace.clone(),
                state.lease.clone(),
            )
        };

        let reusable = match (&lease, active) {
            (Some(lease), true) => lease.is_alive().await,
            _ => false,
        };

        WorkspaceStatus {
            active,
            sandbox_id: workspace.as_ref().map(|w| w.id().to_string()),
            uptime_secs: workspace.as_ref().map(|w| w.instance().uptime_secs()),
            last_activity: workspace.as_ref().map(|w| w.instance().last_activity),
            reusable,
        }
    }

    /// Refresh the heartbeat lease without touching the instance itself.
    pub async fn keep_alive(&self) -> Result<(), WorkspaceError> {
        let lease = self.state.lock().await.lease.clone();
        match lease {
            Some(lease) => Ok(lease.refresh().await?),
            None => Err(WorkspaceError::NotActive),
        }
    }

    /// The workspace currently held, if active.
    pub async fn current(&self) -> Option<Arc<Workspace>> {
        let state = self.state.lock().await;
        if state.phase == Phase::Active {
            state.workspace.clone()
        } else {
            None
        }
    }

    async fn install(&self, workspace: Arc<Workspace>, lease: HeartbeatLease) {
        let mut state = self.state.lock().await;

        if let Some(task) = state.refresh_task.take() {
            task.abort();
        }

        state.last_id = Some(workspace.id().to_string());
        state.workspace = Some(workspace);
        state.refresh_task = self.spawn_refresh_task(&lease);
        state.lease = Some(lease);
        state.phase = Phase::Active;
    }

    fn spawn_refresh_task(&self, lease: &HeartbeatLease) -> Option<JoinHandle<()>> {
        let LivenessPolicy::ActiveRefresh { interval_ms } = &self.liveness else {
            return None;
        };

        let lease = lease.clone();
        let interval = Duration::from_millis((*interval_ms).max(1));
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(err) = lease.refresh().await {
                    warn!(error = %err, "Active lease refresh failed");
                }
            }
        }))
    }
}
