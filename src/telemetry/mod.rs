// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Telemetry, tracing, and metrics infrastructure.
//!
//! - **Tracing**: structured logging with spans for adapter operations
//! - **Metrics**: in-process counters and durations for tools and
//!   workspace lifecycle operations
//!
//! Initialize at application startup:
//!
//! ```rust,ignore
//! use cradle::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::default())?;
//! ```
//!
//! Everything here is gated behind the `telemetry` cargo feature at call
//! sites; the module itself always compiles.

mod init;
pub mod metrics;

pub use init::{init_telemetry, TelemetryConfig};
pub use metrics::{Metrics, MetricsSnapshot, OperationMetrics, ToolMetrics, GLOBAL_METRICS};
