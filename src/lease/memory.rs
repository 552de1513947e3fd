// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory lease store.
//!
//! Backs local workspaces and tests. Expiry is evaluated on access; there
//! is no sweeper task, matching the lazy-liveness design.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::LeaseError;

use super::LeaseStore;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Lease store holding keys in process memory.
#[derive(Default)]
pub struct MemoryLeaseStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryLeaseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Read a live value, pruning it if expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn exists(&self, key: &str) -> Result<u64, LeaseError> {
        Ok(if self.get(key).await.is_some() { 1 } else { 0 })
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LeaseError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), LeaseError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
