// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Metrics collection for performance monitoring.
//!
//! Lightweight in-process metrics without external dependencies. Records
//! tool executions and workspace lifecycle operations (create, connect,
//! stop, commit).

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Central metrics collection.
#[derive(Debug)]
pub struct Metrics {
    /// Tool execution metrics by tool name.
    tools: RwLock<HashMap<String, ToolMetrics>>,

    /// Lifecycle/adapter operation metrics by operation name.
    operations: RwLock<HashMap<String, OperationMetrics>>,

    /// Start time for calculating uptime.
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            operations: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a tool execution.
    pub fn record_tool(&self, name: &str, duration: Duration, success: bool) {
        let mut tools = self.tools.write().unwrap();
        let metrics = tools.entry(name.to_string()).or_insert_with(ToolMetrics::new);
        metrics.record(duration, success);
    }

    /// Record a lifecycle or adapter operation.
    pub fn record_operation(&self, name: &str, duration: Duration) {
        let mut ops = self.operations.write().unwrap();
        let metrics = ops
            .entry(name.to_string())
            .or_insert_with(OperationMetrics::new);
        metrics.record(duration);
    }

    /// Get metrics for a specific tool.
    pub fn tool_metrics(&self, name: &str) -> Option<ToolMetrics> {
        self.tools.read().unwrap().get(name).cloned()
    }

    /// Get metrics for a specific operation.
    pub fn operation_metrics(&self, name: &str) -> Option<OperationMetrics> {
        self.operations.read().unwrap().get(name).cloned()
    }

    /// Get uptime since metrics were initialized.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Take a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tools: self.tools.read().unwrap().clone(),
            operations: self.operations.read().unwrap().clone(),
            uptime: self.uptime(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        self.tools.write().unwrap().clear();
        self.operations.write().unwrap().clear();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for a specific tool.
#[derive(Debug, Clone)]
pub struct ToolMetrics {
    /// Total number of invocations.
    pub invocations: u64,

    /// Number of successful invocations.
    pub successes: u64,

    /// Number of failed invocations.
    pub failures: u64,

    /// Total time spent in this tool.
    pub total_duration: Duration,

    /// Minimum execution time.
    pub min_duration: Duration,

    /// Maximum execution time.
    pub max_duration: Duration,
}

impl ToolMetrics {
    /// Create new empty tool metrics.
    pub fn new() -> Self {
        Self {
            invocations: 0,
            successes: 0,
            failures: 0,
            total_duration: Duration::ZERO,
            min_duration: Duration::MAX,
            max_duration: Duration::ZERO,
        }
    }

    /// Record a tool execution.
    pub fn record(&mut self, duration: Duration, success: bool) {
        self.invocations += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.total_duration += duration;
        self.min_duration = self.min_duration.min(duration);
        self.max_duration = self.max_duration.max(duration);
    }

    /// Calculate average execution time.
    pub fn avg_duration(&self) -> Duration {
        if self.invocations == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.invocations as u32
        }
    }

    /// Calculate success rate (0.0 to 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.invocations == 0 {
            1.0
        } else {
            self.successes as f64 / self.invocations as f64
        }
    }
}

impl Default for ToolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for a lifecycle or adapter operation.
#[derive(Debug, Clone)]
pub struct OperationMetrics {
    /// Number of operations.
    pub count: u64,

    /// Total duration.
    pub total_duration: Duration,

    /// Minimum duration.
    pub min_duration: Duration,

    /// Maximum duration.
    pub max_duration: Duration,
}

impl OperationMetrics {
    /// Create new operation metrics.
    pub fn new() -> Self {
        Self {
            count: 0,
            total_duration: Duration::ZERO,
            min_duration: Duration::MAX,
            max_duration: Duration::ZERO,
        }
    }

    /// Record an operation.
    pub fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total_duration += duration;
        self.min_duration = self.min_duration.min(duration);
        self.max_duration = self.max_duration.max(duration);
    }

    /// Calculate average duration.
    pub fn avg_duration(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.count as u32
        }
    }
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of all metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub tools: HashMap<String, ToolMetrics>,
    pub operations: HashMap<String, OperationMetrics>,
    pub uptime: Duration,
}
