// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup.
//!
//! The crate only emits two kinds of telemetry: adapter-level debug/warn
//! events and the per-dispatch tool spans recorded by the registry. The
//! subscriber here is sized for exactly that - an `EnvFilter` (so
//! `RUST_LOG` keeps working) over a single fmt layer, with span close
//! events opt-in for callers that want tool timings in the log stream.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Options for [`init_telemetry`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level applied to this crate's events when `RUST_LOG` is unset.
    pub level: Level,

    /// Emit span close events, which carry the duration of each tool
    /// dispatch span.
    pub span_timing: bool,

    /// ANSI colors in output.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            span_timing: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Debug-level output with span timings, for diagnosing tool runs.
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            span_timing: true,
            ansi: true,
        }
    }

    /// Set the fallback level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    // `RUST_LOG` wins; otherwise scope the configured level to this
    // crate and keep dependencies at warn.
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("cradle={},warn", self.level)))
    }
}

/// Install the global tracing subscriber.
///
/// Call once at application startup. Fails if a subscriber is already
/// installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TryInitError> {
    let span_events = if config.span_timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(
            fmt::layer()
                .with_ansi(config.ansi)
                .with_span_events(span_events),
        )
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_quiet() {
        let config = TelemetryConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.span_timing);
    }

    #[test]
    fn test_config_verbose_times_spans() {
        let config = TelemetryConfig::verbose();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.span_timing);
    }

    #[test]
    fn test_config_builders() {
        let config = TelemetryConfig::default()
            .with_level(Level::TRACE)
            .with_ansi(false);
        assert_eq!(config.level, Level::TRACE);
        assert!(!config.ansi);
    }
}
