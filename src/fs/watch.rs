// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Debounced filesystem watching.
//!
//! Wraps a `notify` watcher. Raw events are coalesced per path over a
//! short quiet window, then emitted as [`WatchEvent`]s. The returned
//! [`WatchHandle`] is the only cancellation surface: `stop()` is
//! idempotent and tears the watcher down; the handle going out of scope
//! does the same.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::error::ToolError;

/// Quiet window for event coalescing.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    Modify,
    Delete,
    Move,
}

/// A debounced filesystem event.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    /// Path relative to the workspace root where possible.
    pub path: PathBuf,
    pub is_directory: bool,
    pub timestamp: DateTime<Utc>,
}

/// Handle for an active watch.
pub struct WatchHandle {
    watcher: Mutex<Option<RecommendedWatcher>>,
    active: Arc<AtomicBool>,
    events: mpsc::UnboundedReceiver<WatchEvent>,
}

impl WatchHandle {
    /// Receive the next debounced event. Returns `None` once the watch has
    /// stopped and the buffer is drained.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }

    /// Whether the watch is still running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop watching. Safe to call more than once.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        // Dropping the watcher ends the notify thread, which closes the
        // raw channel and lets the debounce task drain out.
        let _ = self.watcher.lock().map(|mut w| w.take());
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start watching `path` (recursively), reporting paths relative to `root`.
pub(crate) fn spawn_watch(root: PathBuf, path: PathBuf) -> Result<WatchHandle, ToolError> {
    let (raw_tx, raw_rx) = std::sync::mpsc::channel::<Event>();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let active = Arc::new(AtomicBool::new(true));

    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(move |result: notify::Result<Event>| {
            if let Ok(event) = result {
                let _ = raw_tx.send(event);
            }
        })
        .map_err(|e| ToolError::IoError(format!("Failed to create watcher: {e}")))?;

    watcher
        .watch(&path, RecursiveMode::Recursive)
        .map_err(|e| ToolError::IoError(format!("Failed to watch {}: {e}", path.display())))?;

    #[cfg(feature = "telemetry")]
    debug!(path = %path.display(), "Watch started");

    let task_active = Arc::clone(&active);
    tokio::task::spawn_blocking(move || {
        debounce_loop(raw_rx, out_tx, root, task_active);
    });

    Ok(WatchHandle {
        watcher: Mutex::new(Some(watcher)),
        active,
        events: out_rx,
    })
}

/// Collect raw events until a quiet window passes, then flush one event
/// per path. Exits when the raw channel closes or the handle deactivates.
fn debounce_loop(
    raw_rx: std::sync::mpsc::Receiver<Event>,
    out_tx: mpsc::UnboundedSender<WatchEvent>,
    root: PathBuf,
    active: Arc<AtomicBool>,
) {
    let mut pending: HashMap<PathBuf, WatchEventKind> = HashMap::new();

    loop {
        let event = match raw_rx.recv_timeout(DEBOUNCE) {
            Ok(event) => Some(event),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => None,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if !active.load(Ordering::SeqCst) {
            break;
        }

        match event {
            Some(event) => {
                if let Some(kind) = map_kind(&event.kind) {
                    for path in event.paths {
                        // Later kinds win within a window, except a create
                        // followed by modify still reads as a create.
                        let entry = pending.entry(path).or_insert(kind);
                        if !(*entry == WatchEventKind::Create && kind == WatchEventKind::Modify) {
                            *entry = kind;
                        }
                    }
                }
            }
            None => {
                for (path, kind) in pending.drain() {
                    let is_directory = path.is_dir();
                    let rel = path.strip_prefix(&root).map(PathBuf::from).unwrap_or(path);
                    let sent = out_tx.send(WatchEvent {
                        kind,
                        path: rel,
                        is_directory,
                        timestamp: Utc::now(),
                    });
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }

    active.store(false, Ordering::SeqCst);
}

fn map_kind(kind: &EventKind) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Create),
        EventKind::Remove(_) => Some(WatchEventKind::Delete),
        EventKind::Modify(notify::event::ModifyKind::Name(_)) => Some(WatchEventKind::Move),
        EventKind::Modify(_) => Some(WatchEventKind::Modify),
        _ => None,
    }
}
