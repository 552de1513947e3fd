// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Workspace resolution cache.
//!
//! Maps stable string keys (a session id, a repo slug) to live
//! workspaces so concurrent tool invocations against the same key share
//! one sandbox instead of racing to create several. Resolution for a key
//! is single-flight: a per-key lock ensures at most one create/connect
//! is in flight while other callers wait and then reuse the result.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::WorkspaceError;
use crate::workspace::{Workspace, WorkspaceManager};

/// Default maximum number of cached workspaces.
pub const DEFAULT_CAPACITY: usize = 32;

struct CacheEntry {
    manager: Arc<WorkspaceManager>,
    workspace: Arc<Workspace>,
    /// Monotonic use counter for least-recently-used eviction.
    last_used: u64,
}

struct ResolverState {
    entries: HashMap<String, CacheEntry>,
    /// Per-key resolution locks, kept separate from the cache map so a
    /// slow create on one key never blocks lookups on another.
    in_flight: HashMap<String, Arc<Mutex<()>>>,
    clock: u64,
}

/// Bounded cache of live workspaces keyed by caller-chosen strings.
pub struct WorkspaceResolver {
    state: Mutex<ResolverState>,
    capacity: usize,
    make_manager: Box<dyn Fn(&str) -> Arc<WorkspaceManager> + Send + Sync>,
}

impl WorkspaceResolver {
    /// Create a resolver with the default capacity. `make_manager` builds
    /// the lifecycle manager for a key on first resolution.
    pub fn new(
        make_manager: impl Fn(&str) -> Arc<WorkspaceManager> + Send + Sync + 'static,
    ) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, make_manager)
    }

    /// Create a resolver that holds at most `capacity` workspaces.
    pub fn with_capacity(
        capacity: usize,
        make_manager: impl Fn(&str) -> Arc<WorkspaceManager> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Mutex::new(ResolverState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                clock: 0,
            }),
            capacity: capacity.max(1),
            make_manager: Box::new(make_manager),
        }
    }

    /// Resolve `key` to a live workspace, creating or reconnecting as
    /// needed.
    ///
    /// A cached workspace is verified with [`Workspace::is_active`]
    /// before reuse; a stale entry is evicted and resolution retried.
    /// Failed resolutions leave no cache entry, so the next call retries
    /// from scratch.
    pub async fn resolve(&self, key: &str) -> Result<Arc<Workspace>, WorkspaceError> {
        let key_lock = {
            let mut state = self.state.lock().await;
            Arc::clone(
                state
                    .in_flight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        // Single-flight: only one resolution per key at a time.
        let _guard = key_lock.lock().await;

        let manager = {
            let mut state = self.state.lock().await;
            state.clock += 1;
            let clock = state.clock;
            if let Some(entry) = state.entries.get_mut(key) {
                if entry.workspace.is_active() {
                    entry.last_used = clock;
                    debug!(key = %key, id = %entry.workspace.id(), "Workspace cache hit");
                    return Ok(Arc::clone(&entry.workspace));
                }
                info!(key = %key, "Cached workspace no longer active, re-resolving");
            }
            // A stale entry's manager is reused so reconnection can find
            // the previous sandbox; connecting replaces its refresh task.
            state.entries.remove(key).map(|entry| entry.manager)
        }
        .unwrap_or_else(|| (self.make_manager)(key));

        let workspace = manager.connect_or_create(None).await?;

        let evicted = {
            let mut state = self.state.lock().await;
            state.clock += 1;
            let clock = state.clock;
            state.entries.insert(
                key.to_string(),
                CacheEntry {
                    manager,
                    workspace: Arc::clone(&workspace),
                    last_used: clock,
                },
            );
            self.enforce_capacity(&mut state)
        };

        // Stopped outside the cache lock; stop() kills the sandbox and
        // clears the lease, so nothing keeps refreshing an evicted entry.
        for manager in evicted {
            manager.stop().await;
        }

        Ok(workspace)
    }

    /// Drop the cache entry for `key`, if present, stopping its
    /// workspace.
    pub async fn invalidate(&self, key: &str) {
        let manager = {
            let mut state = self.state.lock().await;
            state.in_flight.remove(key);
            state.entries.remove(key).map(|entry| entry.manager)
        };

        if let Some(manager) = manager {
            debug!(key = %key, "Workspace cache entry invalidated");
            manager.stop().await;
        }
    }

    /// Number of cached workspaces.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Stop every cached workspace and clear the cache.
    pub async fn shutdown(&self) {
        let managers: Vec<Arc<WorkspaceManager>> = {
            let mut state = self.state.lock().await;
            let managers = state
                .entries
                .drain()
                .map(|(_, entry)| entry.manager)
                .collect();
            state.in_flight.clear();
            managers
        };

        for manager in managers {
            manager.stop().await;
        }
    }

    /// Remove entries past capacity, returning their managers so the
    /// caller can stop them without holding the cache lock.
    fn enforce_capacity(&self, state: &mut ResolverState) -> Vec<Arc<WorkspaceManager>> {
        let mut evicted = Vec::new();
        while state.entries.len() > self.capacity {
            let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            info!(key = %oldest, "Evicting least recently used workspace from cache");
            if let Some(entry) = state.entries.remove(&oldest) {
                evicted.push(entry.manager);
            }
            state.in_flight.remove(&oldest);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LivenessPolicy, SandboxConfig};
    use crate::lease::{LeaseStore, MemoryLeaseStore};
    use crate::sandbox::LocalSandbox;
    use std::path::Path;
    use tempfile::tempdir;

    fn resolver_over(base: &Path, capacity: usize) -> WorkspaceResolver {
        let base = base.to_path_buf();
        let store: Arc<dyn LeaseStore> = Arc::new(MemoryLeaseStore::new());
        WorkspaceResolver::with_capacity(capacity, move |_key| {
            Arc::new(WorkspaceManager::new(
                Arc::new(LocalSandbox::new(&base)),
                Arc::clone(&store),
                SandboxConfig::default(),
                LivenessPolicy::Lazy,
            ))
        })
    }

    #[tokio::test]
    async fn test_same_key_shares_workspace() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 8);

        let a = resolver.resolve("session-1").await.unwrap();
        let b = resolver.resolve("session-1").await.unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(resolver.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_workspaces() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 8);

        let a = resolver.resolve("session-1").await.unwrap();
        let b = resolver.resolve("session-2").await.unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(resolver.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_is_single_flight() {
        let temp = tempdir().unwrap();
        let resolver = Arc::new(resolver_over(temp.path(), 8));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                resolver.resolve("shared").await.unwrap().id().to_string()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_entry_is_re_resolved() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 8);

        let first = resolver.resolve("session-1").await.unwrap();
        first.deactivate();

        let second = resolver.resolve("session-1").await.unwrap();
        assert_ne!(first.id(), second.id());
        assert!(second.is_active());
    }

    #[tokio::test]
    async fn test_invalidate_stops_workspace() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 8);

        let ws = resolver.resolve("session-1").await.unwrap();
        resolver.invalidate("session-1").await;
        assert!(resolver.is_empty().await);
        assert!(!ws.is_active());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 2);

        resolver.resolve("a").await.unwrap();
        resolver.resolve("b").await.unwrap();
        // Touch "a" so "b" becomes the eviction candidate
        resolver.resolve("a").await.unwrap();
        resolver.resolve("c").await.unwrap();

        assert_eq!(resolver.len().await, 2);
        let evicted_b = resolver.resolve("b").await.unwrap();
        // "b" was evicted, so resolving it allocates a new sandbox
        assert!(evicted_b.is_active());
    }

    #[tokio::test]
    async fn test_eviction_stops_workspace() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 1);

        let a = resolver.resolve("a").await.unwrap();
        resolver.resolve("b").await.unwrap();

        assert_eq!(resolver.len().await, 1);
        assert!(!a.is_active());
    }

    #[tokio::test]
    async fn test_eviction_halts_active_refresh() {
        let temp = tempdir().unwrap();
        let base = temp.path().to_path_buf();
        let store = Arc::new(MemoryLeaseStore::new());
        let store_for_managers: Arc<dyn LeaseStore> = store.clone();
        let resolver = WorkspaceResolver::with_capacity(1, move |_key| {
            Arc::new(WorkspaceManager::new(
                Arc::new(LocalSandbox::new(&base)),
                Arc::clone(&store_for_managers),
                SandboxConfig {
                    auto_stop_delay_ms: Some(60),
                    ..Default::default()
                },
                LivenessPolicy::ActiveRefresh { interval_ms: 20 },
            ))
        });

        let a = resolver.resolve("a").await.unwrap();
        let a_key = crate::lease::heartbeat_key(a.id());
        assert!(store.exists(&a_key).await.unwrap() > 0);

        // Evicting "a" must tear down its refresh task and lease
        resolver.resolve("b").await.unwrap();
        assert_eq!(store.exists(&a_key).await.unwrap(), 0);

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(store.exists(&a_key).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_everything() {
        let temp = tempdir().unwrap();
        let resolver = resolver_over(temp.path(), 8);

        let a = resolver.resolve("a").await.unwrap();
        let b = resolver.resolve("b").await.unwrap();
        resolver.shutdown().await;

        assert!(resolver.is_empty().await);
        assert!(!a.is_active());
        assert!(!b.is_active());
    }
}
