// Path: crates/foundations/tests/supervisor.rs

//! Process supervision: readiness detection, spawn failures, and the
//! readiness deadline with captured-log diagnostics.

mod common;

use common::{exiting_node, fake_node};
use plinth_foundations::process::{LaunchCmd, ProcessSupervisor};
use plinth_types::FoundationError;
use std::time::Duration;

#[tokio::test]
async fn detects_readiness_and_supervises_the_process() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(
        dir.path(),
        "node",
        &["booting storage", "Running JSON-RPC server"],
    );

    let cmd = LaunchCmd::new("alice", &bin);
    let mut process = ProcessSupervisor::spawn(cmd).await.expect("spawn");
    assert_eq!(process.name(), "alice");
    assert!(process.is_alive());

    process.kill().await.expect("kill");
    // The pid is released once kill() returns.
    assert!(!process.is_alive());
}

#[tokio::test]
async fn missing_binary_fails_naming_the_path() {
    let cmd = LaunchCmd::new("alice", "/definitely/not/here/polkadot");
    let err = ProcessSupervisor::spawn(cmd).await.unwrap_err();
    match err {
        FoundationError::Startup { reason } => {
            assert!(reason.contains("/definitely/not/here/polkadot"));
        }
        other => panic!("expected startup error, got {other:?}"),
    }
}

#[tokio::test]
async fn readiness_timeout_carries_the_captured_logs() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node", &["still compiling wasm", "warming caches"]);

    let mut cmd = LaunchCmd::new("alice", &bin);
    cmd.ready_timeout = Duration::from_secs(1);
    let err = ProcessSupervisor::spawn(cmd).await.unwrap_err();
    match err {
        FoundationError::Startup { reason } => {
            assert!(reason.contains("did not emit readiness pattern"));
            assert!(reason.contains("still compiling wasm"));
            assert!(reason.contains("warming caches"));
        }
        other => panic!("expected startup error, got {other:?}"),
    }
}

#[tokio::test]
async fn early_exit_fails_before_the_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let bin = exiting_node(dir.path(), "node", &["panicked at genesis"]);

    let mut cmd = LaunchCmd::new("alice", &bin);
    cmd.ready_timeout = Duration::from_secs(30);
    let started = std::time::Instant::now();
    let err = ProcessSupervisor::spawn(cmd).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(10));
    match err {
        FoundationError::Startup { reason } => {
            assert!(reason.contains("before becoming ready"));
            assert!(reason.contains("panicked at genesis"));
        }
        other => panic!("expected startup error, got {other:?}"),
    }
}

#[tokio::test]
async fn custom_patterns_match_regular_expressions() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node", &["imported block #1 (0xabc)"]);

    let mut cmd = LaunchCmd::new("alice", &bin);
    cmd.ready_pattern = regex::Regex::new(r"imported block #\d+").unwrap();
    let mut process = ProcessSupervisor::spawn(cmd).await.expect("spawn");
    process.kill().await.expect("kill");
}
