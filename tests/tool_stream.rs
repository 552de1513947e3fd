// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the tool event stream and auto-commit behavior, run against
//! the local sandbox provider and a real git binary.

use std::sync::Arc;

use tempfile::tempdir;

use cradle::config::{LivenessPolicy, SandboxConfig};
use cradle::lease::MemoryLeaseStore;
use cradle::sandbox::LocalSandbox;
use cradle::tools::{run_tool, ToolEvent, ToolRegistry};
use cradle::workspace::{Workspace, WorkspaceManager, WorkspaceResolver};

async fn live_workspace(base: &std::path::Path) -> Arc<Workspace> {
    let manager = WorkspaceManager::new(
        Arc::new(LocalSandbox::new(base)),
        Arc::new(MemoryLeaseStore::new()),
        SandboxConfig::default(),
        LivenessPolicy::Lazy,
    );
    manager.connect_or_create(None).await.unwrap()
}

async fn git_workspace(base: &std::path::Path) -> Arc<Workspace> {
    let workspace = live_workspace(base).await;
    workspace.git().init().await.unwrap();
    workspace
        .git()
        .config("user.email", Some("test@example.com"))
        .await
        .unwrap();
    workspace
        .git()
        .config("user.name", Some("Test"))
        .await
        .unwrap();
    workspace
}

async fn collect(mut rx: tokio::sync::mpsc::Receiver<ToolEvent>) -> Vec<ToolEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn terminal_metadata(events: &[ToolEvent]) -> &serde_json::Value {
    match events.last().unwrap() {
        ToolEvent::Done { metadata, .. } => metadata,
        other => panic!("expected done event, got {other:?}"),
    }
}

// ============================================================================
// Stream shape
// ============================================================================

#[tokio::test]
async fn test_stream_is_pending_then_terminal() {
    let base = tempdir().unwrap();
    let workspace = live_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let rx = run_tool(
        registry,
        workspace,
        "bash",
        serde_json::json!({"command": "echo ok"}),
        "run echo",
    );
    let events = collect(rx).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ToolEvent::Pending { .. }));
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn test_failing_command_yields_error_event() {
    let base = tempdir().unwrap();
    let workspace = live_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let rx = run_tool(
        registry,
        workspace,
        "bash",
        serde_json::json!({"command": "exit 7"}),
        "run a failing command",
    );
    let events = collect(rx).await;

    match events.last().unwrap() {
        ToolEvent::Error { error, .. } => assert!(error.message.contains("code 7")),
        other => panic!("expected error event, got {other:?}"),
    }
}

// ============================================================================
// Auto-commit gating
// ============================================================================

#[tokio::test]
async fn test_readonly_command_produces_no_commit() {
    let base = tempdir().unwrap();
    let workspace = git_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let rx = run_tool(
        registry,
        workspace.clone(),
        "bash",
        serde_json::json!({"command": "true"}),
        "run a no-op",
    );
    let events = collect(rx).await;

    let metadata = terminal_metadata(&events);
    assert!(metadata.get("commitHash").is_none());
    assert!(workspace.git().log(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_creating_command_is_committed() {
    let base = tempdir().unwrap();
    let workspace = git_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let rx = run_tool(
        registry,
        workspace.clone(),
        "bash",
        serde_json::json!({"command": "echo data > generated.txt"}),
        "create a file",
    );
    let events = collect(rx).await;

    let metadata = terminal_metadata(&events);
    let hash = metadata["commitHash"].as_str().unwrap();
    assert!(hash.len() >= 7);

    let status = workspace.git().status().await.unwrap();
    assert!(status.clean);
}

#[tokio::test]
async fn test_write_file_tool_is_committed() {
    let base = tempdir().unwrap();
    let workspace = git_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let rx = run_tool(
        registry,
        workspace.clone(),
        "write_file",
        serde_json::json!({"path": "src/answer.txt", "content": "42"}),
        "write the answer",
    );
    let events = collect(rx).await;

    let metadata = terminal_metadata(&events);
    assert!(metadata["commitHash"].as_str().is_some());

    let log = workspace.git().log(1).await.unwrap();
    assert_eq!(log[0].message, "Auto-commit: write_file");
}

#[tokio::test]
async fn test_no_repo_still_succeeds_without_commit() {
    let base = tempdir().unwrap();
    let workspace = live_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let rx = run_tool(
        registry,
        workspace,
        "write_file",
        serde_json::json!({"path": "plain.txt", "content": "no repo here"}),
        "write without a repository",
    );
    let events = collect(rx).await;

    let metadata = terminal_metadata(&events);
    assert!(metadata.get("commitHash").is_none());
}

// ============================================================================
// Resolver integration
// ============================================================================

#[tokio::test]
async fn test_resolver_reuses_workspace_across_tool_calls() {
    let base = tempdir().unwrap();
    let base_path = base.path().to_path_buf();
    let store: Arc<dyn cradle::lease::LeaseStore> = Arc::new(MemoryLeaseStore::new());

    let resolver = WorkspaceResolver::new(move |_key| {
        Arc::new(WorkspaceManager::new(
            Arc::new(LocalSandbox::new(&base_path)),
            Arc::clone(&store),
            SandboxConfig::default(),
            LivenessPolicy::Lazy,
        ))
    });
    let registry = Arc::new(ToolRegistry::with_defaults());

    let first = resolver.resolve("session").await.unwrap();
    let rx = run_tool(
        Arc::clone(&registry),
        first.clone(),
        "bash",
        serde_json::json!({"command": "echo one > a.txt"}),
        "write a marker",
    );
    collect(rx).await;

    let second = resolver.resolve("session").await.unwrap();
    assert_eq!(first.id(), second.id());
    assert_eq!(
        second.fs().read_file("a.txt").await.unwrap().trim(),
        "one"
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_mutations_all_commit() {
    let base = tempdir().unwrap();
    let workspace = git_workspace(base.path()).await;
    let registry = Arc::new(ToolRegistry::with_defaults());

    let mut handles = Vec::new();
    for i in 0..4 {
        let registry = Arc::clone(&registry);
        let workspace = Arc::clone(&workspace);
        handles.push(tokio::spawn(async move {
            let rx = run_tool(
                registry,
                workspace,
                "write_file",
                serde_json::json!({"path": format!("f{i}.txt"), "content": format!("{i}")}),
                format!("write file {i}"),
            );
            collect(rx).await
        }));
    }

    for handle in handles {
        let events = handle.await.unwrap();
        assert!(matches!(events.last().unwrap(), ToolEvent::Done { .. }));
    }

    // Each mutation held the lock, so every file landed in its own commit
    let log = workspace.git().log(10).await.unwrap();
    assert_eq!(log.len(), 4);
    let status = workspace.git().status().await.unwrap();
    assert!(status.clean);
}
