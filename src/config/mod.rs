// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Workspace configuration.
//!
//! Settings are loaded from `.cradle.json`, `.cradle.yaml`, or
//! `.cradle/config.json` in the workspace root. All fields are optional;
//! anything unset falls back to defaults in [`types`].

pub mod loader;
pub mod types;

pub use loader::{find_workspace_root, load_settings, load_settings_file, save_settings, CONFIG_FILES};
pub use types::{LivenessPolicy, SandboxConfig, WorkspaceSettings, DEFAULT_TIMEOUT_MS};
