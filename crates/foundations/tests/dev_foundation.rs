// Path: crates/foundations/tests/dev_foundation.rs

//! Dev foundation lifecycle: the state machine, health-check gating, and the
//! one-shot stop capability.

mod common;

use common::fake_node;
use assert_matches::assert_matches;
use plinth_foundations::{DevFoundation, Foundation};
use plinth_types::{DevConfig, FoundationError, FoundationStatus, NodeRole, PortsConfig};

fn dev_config(bin_path: std::path::PathBuf) -> DevConfig {
    DevConfig {
        bin_path,
        name: "alice".into(),
        ports: PortsConfig {
            p2p_port: None,
            ws_port: Some(9944),
            rpc_port: None,
        },
        options: None,
        ready_pattern: None,
        ready_timeout_secs: Some(10),
    }
}

#[tokio::test]
async fn happy_path_runs_one_node_then_stops() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node", &["Running JSON-RPC server"]);
    let mut foundation = DevFoundation::new(dev_config(bin));

    assert_eq!(foundation.status(), FoundationStatus::Stopped);

    let outcome = foundation.start().await.expect("start");
    assert_eq!(outcome.info.nodes.len(), 1);
    assert_eq!(outcome.info.nodes[0].role, NodeRole::Binary);
    assert_eq!(outcome.info.nodes[0].ws_endpoint, "ws://127.0.0.1:9944");
    assert_matches!(
        foundation.status(),
        FoundationStatus::Running { node_count: 1, .. }
    );

    foundation.health_check().await.expect("health check");

    foundation.stop().await.expect("stop");
    assert_eq!(foundation.status(), FoundationStatus::Stopped);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node", &["Running JSON-RPC server"]);
    let mut foundation = DevFoundation::new(dev_config(bin));

    // Stopping a never-started foundation is a no-op, not an error.
    foundation.stop().await.expect("stop while stopped");
    assert_eq!(foundation.status(), FoundationStatus::Stopped);

    foundation.start().await.expect("start");
    foundation.stop().await.expect("stop");
    foundation.stop().await.expect("second stop");
    assert_eq!(foundation.status(), FoundationStatus::Stopped);
}

#[tokio::test]
async fn double_start_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node", &["Running JSON-RPC server"]);
    let mut foundation = DevFoundation::new(dev_config(bin));

    foundation.start().await.expect("start");
    let err = foundation.start().await.unwrap_err();
    assert_matches!(err, FoundationError::Startup { .. });
    assert!(err.to_string().contains("already running"));

    foundation.stop().await.expect("stop");
}

#[tokio::test]
async fn health_check_requires_running_without_io() {
    let mut foundation = DevFoundation::new(dev_config("/nonexistent/node".into()));

    // Stopped: fails immediately (there is no process to probe anyway).
    let err = foundation.health_check().await.unwrap_err();
    assert_matches!(err, FoundationError::HealthCheck { .. });

    // Failed: still gated.
    foundation.start().await.unwrap_err();
    assert_matches!(foundation.status(), FoundationStatus::Failed { .. });
    let err = foundation.health_check().await.unwrap_err();
    assert_matches!(err, FoundationError::HealthCheck { .. });
}

#[tokio::test]
async fn failed_is_not_terminal() {
    let mut foundation = DevFoundation::new(dev_config("/nonexistent/node".into()));

    let err = foundation.start().await.unwrap_err();
    assert!(err.to_string().contains("/nonexistent/node"));
    assert_matches!(foundation.status(), FoundationStatus::Failed { .. });

    // A subsequent start is permitted; it fails on the same missing binary,
    // not on the state machine.
    let err = foundation.start().await.unwrap_err();
    assert!(!err.to_string().contains("already running"));
}

#[tokio::test]
async fn stop_handle_is_scoped_to_its_start_call() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node", &["Running JSON-RPC server"]);
    let mut foundation = DevFoundation::new(dev_config(bin));

    let outcome = foundation.start().await.expect("start");
    assert!(foundation.status().is_running());

    // Tearing down through the handle is reflected in the service status,
    // and the service-level stop stays an idempotent no-op afterwards.
    outcome.stop.stop().await.expect("handle stop");
    assert_eq!(foundation.status(), FoundationStatus::Stopped);
    foundation.stop().await.expect("stop after handle");
}
