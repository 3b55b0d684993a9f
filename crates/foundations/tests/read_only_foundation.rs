// Path: crates/foundations/tests/read_only_foundation.rs

//! ReadOnly foundation and the closed-enum topology dispatch.

use assert_matches::assert_matches;
use plinth_foundations::{Foundation, FoundationVariant, ReadOnlyFoundation};
use plinth_types::{FoundationConfig, FoundationStatus, ReadOnlyConfig};

fn read_only_config() -> ReadOnlyConfig {
    serde_json::from_value(serde_json::json!({
        "name": "live",
        "connections": [
            { "name": "remote", "type": "substrateWs", "endpoints": ["wss://rpc.example.net"] }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn start_records_connections_without_spawning() {
    let mut foundation = ReadOnlyFoundation::new(read_only_config());

    let outcome = foundation.start().await.expect("start");
    assert_eq!(outcome.info.endpoints, vec!["wss://rpc.example.net"]);
    assert!(outcome.info.nodes.is_empty());
    assert!(outcome.info.control_socket.is_none());
    assert_matches!(
        foundation.status(),
        FoundationStatus::Running { node_count: 0, .. }
    );

    // Running is the only gate the foundation itself checks; liveness of the
    // remote network is the providers' concern.
    foundation.health_check().await.expect("health check");

    foundation.stop().await.expect("stop");
    foundation.stop().await.expect("idempotent stop");
    assert_eq!(foundation.status(), FoundationStatus::Stopped);
}

#[tokio::test]
async fn health_check_is_gated_on_running() {
    let foundation = ReadOnlyFoundation::new(read_only_config());
    let err = foundation.health_check().await.unwrap_err();
    assert!(err.to_string().contains("stopped"));
}

#[tokio::test]
async fn variant_dispatch_matches_the_config_topology() {
    let config = FoundationConfig::ReadOnly(read_only_config());
    let mut variant = FoundationVariant::from_config(config);
    assert_eq!(variant.topology(), "read_only");
    assert!(variant.as_zombie().is_none());

    variant.start().await.expect("start through the variant");
    assert!(variant.status().is_running());
    variant.stop().await.expect("stop through the variant");
    assert_eq!(variant.status(), FoundationStatus::Stopped);
}
