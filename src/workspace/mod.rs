// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Workspace contract and lifecycle.
//!
//! A [`Workspace`] bundles the filesystem, shell, and git adapters bound
//! to one sandbox instance. The [`WorkspaceManager`] owns the lifecycle
//! (create, reconnect, stop) and the heartbeat lease; the
//! [`WorkspaceResolver`] memoizes live workspaces behind stable cache
//! keys so concurrent tool invocations share one instance.

pub mod manager;
pub mod resolver;

pub use manager::{WorkspaceManager, WorkspaceStatus};
pub use resolver::WorkspaceResolver;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::fs::WorkspaceFs;
use crate::git::Git;
use crate::sandbox::SandboxInstance;
use crate::shell::Shell;

/// Live workspace: one sandbox instance plus its adapters.
///
/// Mutating tool calls must hold [`Workspace::mutation_lock`] for the
/// whole pre-status → operation → post-status → commit sequence so the
/// change detection used for auto-commit never sees another call's
/// interleaved writes.
pub struct Workspace {
    instance: SandboxInstance,
    fs: WorkspaceFs,
    shell: Shell,
    git: Git,
    mutation_lock: Mutex<()>,
    active: AtomicBool,
}

impl Workspace {
    /// Bind adapters to a sandbox instance.
    pub fn new(instance: SandboxInstance) -> Self {
        let shell = Shell::new(&instance.root);
        Self {
            fs: WorkspaceFs::new(&instance.root),
            git: Git::new(shell.clone()),
            shell,
            active: AtomicBool::new(instance.active),
            mutation_lock: Mutex::new(()),
            instance,
        }
    }

    /// Sandbox identity.
    pub fn id(&self) -> &str {
        &self.instance.id
    }

    /// Root directory the adapters operate in.
    pub fn root(&self) -> &Path {
        &self.instance.root
    }

    /// The sandbox instance this workspace is bound to.
    pub fn instance(&self) -> &SandboxInstance {
        &self.instance
    }

    /// Filesystem adapter.
    pub fn fs(&self) -> &WorkspaceFs {
        &self.fs
    }

    /// Shell adapter.
    pub fn bash(&self) -> &Shell {
        &self.shell
    }

    /// Version-control adapter.
    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Whether this workspace is still usable.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark the workspace unusable. Called by the manager on stop.
    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Lock serializing mutating operations against this workspace.
    pub fn mutation_lock(&self) -> &Mutex<()> {
        &self.mutation_lock
    }
}
