// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions.
//!
//! Defines sandbox and workspace configuration, supporting JSON and YAML
//! formats.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default sandbox timeout when nothing is configured (5 minutes).
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Configuration for one sandbox instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SandboxConfig {
    /// Execution timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// How long an idle sandbox stays alive before the provider may reclaim
    /// it, in milliseconds. Falls back to `timeout_ms` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_stop_delay_ms: Option<u64>,

    /// Ports exposed by the sandbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,

    /// Runtime image or environment identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Metadata tags attached to the sandbox at the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl SandboxConfig {
    /// Lease TTL for this configuration: `auto_stop_delay ?? timeout ??
    /// default`, clamped to at least one millisecond.
    pub fn lease_ttl(&self) -> Duration {
        let ms = self
            .auto_stop_delay_ms
            .or(self.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
            .max(1);
        Duration::from_millis(ms)
    }

    /// Merge another config over this one; fields set in `other` win.
    pub fn merged_with(&self, other: &SandboxConfig) -> SandboxConfig {
        SandboxConfig {
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
            auto_stop_delay_ms: other.auto_stop_delay_ms.or(self.auto_stop_delay_ms),
            ports: other.ports.clone().or_else(|| self.ports.clone()),
            runtime: other.runtime.clone().or_else(|| self.runtime.clone()),
            metadata: other.metadata.clone().or_else(|| self.metadata.clone()),
        }
    }
}

/// How a workspace's heartbeat lease is kept fresh.
///
/// `Lazy` renews the lease only on explicit keep-alive or reconnect; a
/// workspace left untouched longer than the TTL expires and the next
/// resolution recreates it. `ActiveRefresh` runs a background task that
/// refreshes the lease on an interval until the workspace stops.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "mode")]
pub enum LivenessPolicy {
    /// No background refresh; lease is renewed lazily.
    #[default]
    Lazy,

    /// Refresh the lease every `intervalMs` milliseconds while active.
    ActiveRefresh { interval_ms: u64 },
}

const fn default_true() -> bool {
    true
}

/// Workspace-level settings loaded from a config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    /// Sandbox configuration.
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Lease refresh policy.
    #[serde(default)]
    pub liveness: LivenessPolicy,

    /// Base URL of the remote sandbox service, if any. When absent the
    /// local process sandbox is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_base_url: Option<String>,

    /// Whether mutating tools commit detected changes automatically.
    #[serde(default = "default_true")]
    pub auto_commit: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            sandbox: SandboxConfig::default(),
            liveness: LivenessPolicy::default(),
            remote_base_url: None,
            auto_commit: true,
        }
    }
}
