// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Leased-liveness protocol for remote workspaces.
//!
//! A workspace is considered *alive* iff its heartbeat key exists in a
//! shared key-value store. Absence means the remote instance may already
//! have been reclaimed. There is no background monitor by default:
//! liveness is evaluated lazily at resolution time and renewed only on
//! explicit keep-alive or reconnect (see
//! [`LivenessPolicy`](crate::config::LivenessPolicy) for the opt-in
//! active-refresh mode).
//!
//! The [`LeaseStore`] trait is the boundary to the external key-value
//! service. Store failures are conservatively treated as "not alive" so a
//! flaky store degrades to recreation, never to reusing a dead sandbox.

mod memory;

pub use memory::MemoryLeaseStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::LeaseError;

/// Key prefix for workspace heartbeat leases.
pub const HEARTBEAT_PREFIX: &str = "workspace:heartbeat:";

/// Build the heartbeat key for a sandbox id.
pub fn heartbeat_key(sandbox_id: &str) -> String {
    format!("{HEARTBEAT_PREFIX}{sandbox_id}")
}

/// External key-value store contract for liveness leases.
///
/// Matches the shape of a distributed cache: existence check returning a
/// count, set with expiry, and delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaseStore: Send + Sync {
    /// Number of matching keys (0 or 1 for a single key).
    async fn exists(&self, key: &str) -> Result<u64, LeaseError>;

    /// Set a key with a time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LeaseError>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> Result<(), LeaseError>;
}

/// Heartbeat lease for one workspace, bound to a store and TTL.
#[derive(Clone)]
pub struct HeartbeatLease {
    store: Arc<dyn LeaseStore>,
    key: String,
    ttl: Duration,
}

impl HeartbeatLease {
    /// Create a lease handle for `sandbox_id`. The TTL should come from
    /// [`SandboxConfig::lease_ttl`](crate::config::SandboxConfig::lease_ttl).
    pub fn new(store: Arc<dyn LeaseStore>, sandbox_id: &str, ttl: Duration) -> Self {
        Self {
            store,
            key: heartbeat_key(sandbox_id),
            ttl: ttl.max(Duration::from_millis(1)),
        }
    }

    /// The heartbeat key this lease manages.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the lease currently exists. Store errors count as dead.
    pub async fn is_alive(&self) -> bool {
        match self.store.exists(&self.key).await {
            Ok(count) => count > 0,
            Err(err) => {
                warn!(key = %self.key, error = %err, "Lease store check failed, treating as not alive");
                false
            }
        }
    }

    /// Write or renew the lease with the configured TTL.
    pub async fn refresh(&self) -> Result<(), LeaseError> {
        let now = chrono::Utc::now().timestamp_millis().to_string();
        self.store.set(&self.key, &now, self.ttl).await
    }

    /// Remove the lease.
    pub async fn clear(&self) -> Result<(), LeaseError> {
        self.store.del(&self.key).await
    }
}

/// Check liveness for a sandbox id without constructing a lease handle.
pub async fn is_alive(store: &Arc<dyn LeaseStore>, sandbox_id: &str) -> bool {
    let key = heartbeat_key(sandbox_id);
    match store.exists(&key).await {
        Ok(count) => count > 0,
        Err(err) => {
            warn!(key = %key, error = %err, "Lease store check failed, treating as not alive");
            false
        }
    }
}
