// Path: crates/cli/tests/environment.rs

//! End-to-end environment lifecycle: foundation start, provider connection,
//! node control passthrough, and teardown.

use assert_matches::assert_matches;
use async_trait::async_trait;
use plinth_cli::Environment;
use plinth_providers::{ChainClient, Connector, ConnectorFactory};
use plinth_types::{
    EnvironmentConfig, FoundationStatus, ProviderKind, ProviderServiceStatus, RetryPolicy,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fake_node(dir: &Path, name: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(
        &path,
        "#!/bin/sh\necho \"Running JSON-RPC server\"\nexec sleep 600\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn dev_environment(bin: &Path, providers: serde_json::Value) -> EnvironmentConfig {
    serde_json::from_value(serde_json::json!({
        "name": "dev_local",
        "foundation": {
            "type": "dev",
            "binPath": bin,
            "name": "alice",
            "ports": { "wsPort": 9944 },
            "readyTimeoutSecs": 10
        },
        "providers": providers
    }))
    .unwrap()
}

/// A connector that always succeeds, for driving the environment without a
/// real chain endpoint.
struct OkFactory;

impl ConnectorFactory for OkFactory {
    fn connector(&self, _kind: ProviderKind) -> Box<dyn Connector> {
        Box::new(OkConnector)
    }
}

struct OkConnector;

#[async_trait]
impl Connector for OkConnector {
    async fn connect(&self, _endpoint: &str) -> Result<Box<dyn ChainClient>, String> {
        Ok(Box::new(OkClient))
    }
}

struct OkClient;

#[async_trait]
impl ChainClient for OkClient {
    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }

    async fn raw_request(
        &self,
        method: &str,
        _params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, String> {
        Ok(serde_json::json!({ "echo": method }))
    }
}

#[tokio::test]
async fn dev_environment_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node");
    let config = dev_environment(&bin, serde_json::json!([]));

    let mut env = Environment::from_config(config);
    assert_eq!(env.topology(), "dev");
    assert_eq!(env.foundation_status(), FoundationStatus::Stopped);

    let info = env.start().await.expect("start");
    assert_eq!(info.nodes.len(), 1);
    assert_matches!(
        env.foundation_status(),
        FoundationStatus::Running { node_count: 1, .. }
    );

    env.health_check().await.expect("health check");

    env.destroy().await.expect("destroy");
    assert_eq!(env.foundation_status(), FoundationStatus::Stopped);
}

#[tokio::test]
async fn providers_connect_through_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node");
    let providers = serde_json::json!([
        { "name": "para", "type": "substrateWs", "endpoints": ["ws://127.0.0.1:9944"] },
        { "name": "eth", "type": "ethWs", "endpoints": ["ws://127.0.0.1:9944"] }
    ]);
    let config = dev_environment(&bin, providers);

    let mut env = Environment::from_config(config)
        .with_connector_factory(RetryPolicy::default(), Arc::new(OkFactory));

    env.start().await.expect("start");
    env.connect().await.expect("connect");
    assert_matches!(
        env.provider_status(),
        ProviderServiceStatus::Connected { connected: 2, .. }
    );
    assert!(env.providers().provider("para").is_some());

    // Block-control ops ride a connected provider's raw RPC surface.
    let echoed = env.create_block(1).await.expect("create block");
    assert_eq!(echoed["echo"], "dev_newBlock");

    env.destroy().await.expect("destroy");
    assert_eq!(*env.provider_status(), ProviderServiceStatus::Disconnected);
    assert!(env.providers().all_providers().is_empty());
}

#[tokio::test]
async fn node_control_requires_a_control_channel() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "node");
    let mut env = Environment::from_config(dev_environment(&bin, serde_json::json!([])));

    env.start().await.expect("start");

    // A dev foundation has no control channel; node ops fail typed.
    let err = env.restart_node("alice").await.unwrap_err();
    assert_eq!(err.operation, "restart");
    assert_eq!(err.node_name, "alice");
    assert!(err.reason.contains("control channel"));

    env.destroy().await.expect("destroy");
}

#[tokio::test]
async fn zombie_environment_drives_nodes_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_node(dir.path(), "polkadot");
    let spec = serde_json::json!({
        "relaychain": {
            "chain": "rococo-local",
            "defaultCommand": bin,
            "nodes": [ { "name": "alice" }, { "name": "bob" } ]
        }
    });
    let spec_path = dir.path().join("network.json");
    std::fs::write(&spec_path, serde_json::to_vec(&spec).unwrap()).unwrap();

    let config: EnvironmentConfig = serde_json::from_value(serde_json::json!({
        "name": "zombie_local",
        "foundation": {
            "type": "zombie",
            "configPath": spec_path,
            "name": "zombie"
        }
    }))
    .unwrap();

    let mut env = Environment::from_config(config);
    env.start().await.expect("start network");

    assert!(env.is_up("alice").await.expect("isup alice"));
    env.kill_node("bob").await.expect("kill bob");
    assert!(!env.is_up("bob").await.expect("isup killed bob"));
    env.restart_node("bob").await.expect("restart bob");
    assert!(env.is_up("bob").await.expect("isup restarted bob"));

    // Unknown node: a typed failure, not a transport error.
    let err = env.is_up("mallory").await.unwrap_err();
    assert!(err.reason.contains("unknown node"));

    env.destroy().await.expect("destroy");
    assert_eq!(env.foundation_status(), FoundationStatus::Stopped);
}
