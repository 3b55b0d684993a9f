// Path: crates/foundations/tests/chopsticks_foundation.rs

//! Chopsticks foundation: YAML validation, effective-port resolution, and
//! lifecycle.

mod common;

use assert_matches::assert_matches;
use common::fake_node;
use plinth_foundations::{ChopsticksFoundation, Foundation};
use plinth_types::{ChopsticksConfig, FoundationError, FoundationStatus, LaunchSpec};
use std::path::Path;

fn chopsticks_config(dir: &Path, yaml: &str) -> ChopsticksConfig {
    let config_path = dir.join("fork.yml");
    std::fs::write(&config_path, yaml).unwrap();
    let bin = fake_node(dir, "chopsticks", &["chopsticks listening on port 8011"]);
    ChopsticksConfig {
        config_path,
        name: "fork".into(),
        launch_spec: LaunchSpec {
            command: bin,
            args: vec![],
            ready_pattern: None,
            ready_timeout_secs: Some(10),
        },
    }
}

#[tokio::test]
async fn reads_the_effective_port_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let config = chopsticks_config(dir.path(), "endpoint: wss://rpc.example.net\nport: 8011\n");
    let mut foundation = ChopsticksFoundation::new(config);

    let outcome = foundation.start().await.expect("start");
    assert_eq!(outcome.info.endpoints, vec!["ws://127.0.0.1:8011"]);
    assert_matches!(
        foundation.status(),
        FoundationStatus::Running { node_count: 1, .. }
    );

    foundation.stop().await.expect("stop");
    assert_eq!(foundation.status(), FoundationStatus::Stopped);
}

#[tokio::test]
async fn defaults_the_port_when_yaml_omits_it() {
    let dir = tempfile::tempdir().unwrap();
    let config = chopsticks_config(dir.path(), "endpoint: wss://rpc.example.net\n");
    let mut foundation = ChopsticksFoundation::new(config);

    let outcome = foundation.start().await.expect("start");
    assert_eq!(outcome.info.endpoints, vec!["ws://127.0.0.1:8000"]);
    foundation.stop().await.expect("stop");
}

#[tokio::test]
async fn missing_or_malformed_yaml_fails_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = chopsticks_config(dir.path(), "port: 8011\n");
    config.config_path = dir.path().join("absent.yml");
    let mut foundation = ChopsticksFoundation::new(config);

    let err = foundation.start().await.unwrap_err();
    match err {
        FoundationError::Startup { reason } => assert!(reason.contains("absent.yml")),
        other => panic!("expected startup error, got {other:?}"),
    }
    assert_matches!(foundation.status(), FoundationStatus::Failed { .. });

    let mut config = chopsticks_config(dir.path(), "port: [not, a, port");
    config.launch_spec.ready_timeout_secs = Some(1);
    let mut foundation = ChopsticksFoundation::new(config);
    let err = foundation.start().await.unwrap_err();
    assert!(err.to_string().contains("not valid YAML"));
}
