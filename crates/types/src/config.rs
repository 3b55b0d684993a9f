// Path: crates/types/src/config.rs

//! Shared configuration structures for the plinth harness.
//!
//! These are the already-resolved values handed to the core by the
//! environment-config loader; schema validation happens upstream.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The sentinel endpoint value replaced by the `PLINTH_ENDPOINT` process
/// environment variable at connection time.
pub const ENDPOINT_FROM_ENV: &str = "from-env";

/// The environment variable consulted when an endpoint is [`ENDPOINT_FROM_ENV`].
pub const ENDPOINT_ENV_VAR: &str = "PLINTH_ENDPOINT";

/// Topology-discriminated foundation configuration. Immutable once passed to
/// `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FoundationConfig {
    /// A single local development node.
    Dev(DevConfig),
    /// A forked/replay node running under chopsticks.
    Chopsticks(ChopsticksConfig),
    /// A multi-node relay + parachain network.
    Zombie(ZombieConfig),
    /// A read-only connection to an existing network; no process is spawned.
    ReadOnly(ReadOnlyConfig),
}

impl FoundationConfig {
    /// The human-readable name of the configured foundation.
    pub fn name(&self) -> &str {
        match self {
            Self::Dev(c) => &c.name,
            Self::Chopsticks(c) => &c.name,
            Self::Zombie(c) => &c.name,
            Self::ReadOnly(c) => &c.name,
        }
    }

    /// The topology label used in logs and status output.
    pub fn topology(&self) -> &'static str {
        match self {
            Self::Dev(_) => "dev",
            Self::Chopsticks(_) => "chopsticks",
            Self::Zombie(_) => "zombie",
            Self::ReadOnly(_) => "read_only",
        }
    }
}

/// Configuration for the Dev foundation: one locally spawned node binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    /// Path to the node binary.
    pub bin_path: PathBuf,
    /// Node name, used for logs and `NodeInfo`.
    pub name: String,
    /// Explicitly configured ports; flags are appended only for ports set here.
    #[serde(default)]
    pub ports: PortsConfig,
    /// When set, replaces the default launch argument set wholesale.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Override for the readiness log pattern (a regular expression).
    #[serde(default)]
    pub ready_pattern: Option<String>,
    /// Override for the readiness deadline in seconds.
    #[serde(default)]
    pub ready_timeout_secs: Option<u64>,
}

/// Explicit port assignments for a Dev node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortsConfig {
    /// P2P port (`--port`).
    #[serde(default)]
    pub p2p_port: Option<u16>,
    /// Websocket RPC port (`--ws-port`).
    #[serde(default)]
    pub ws_port: Option<u16>,
    /// HTTP RPC port (`--rpc-port`).
    #[serde(default)]
    pub rpc_port: Option<u16>,
}

/// Configuration for the Chopsticks foundation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChopsticksConfig {
    /// Path to the chopsticks YAML configuration file.
    pub config_path: PathBuf,
    /// Foundation name.
    pub name: String,
    /// How to launch the chopsticks process.
    pub launch_spec: LaunchSpec,
}

/// A generic launch specification for a sidecar command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSpec {
    /// The command to execute.
    pub command: PathBuf,
    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Override for the readiness log pattern (a regular expression).
    #[serde(default)]
    pub ready_pattern: Option<String>,
    /// Override for the readiness deadline in seconds.
    #[serde(default)]
    pub ready_timeout_secs: Option<u64>,
}

/// Configuration for the Zombie foundation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZombieConfig {
    /// Path to the JSON multi-node launch specification.
    pub config_path: PathBuf,
    /// Foundation name.
    pub name: String,
}

/// Configuration for the ReadOnly foundation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOnlyConfig {
    /// Foundation name.
    pub name: String,
    /// Connection descriptors for the existing network.
    pub connections: Vec<ProviderConfig>,
}

/// The multi-node launch specification loaded from a Zombie config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZombieNetworkSpec {
    /// Relay chain nodes.
    pub relaychain: RelaychainSpec,
    /// Parachains, each with its collators.
    #[serde(default)]
    pub parachains: Vec<ParachainSpec>,
}

/// Relay chain section of a Zombie launch specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaychainSpec {
    /// Chain spec identifier (e.g. `rococo-local`).
    pub chain: String,
    /// Binary used for nodes that do not set their own `command`.
    pub default_command: PathBuf,
    /// Arguments prepended to every relay node's own argument list.
    #[serde(default)]
    pub default_args: Vec<String>,
    /// The relay chain nodes.
    pub nodes: Vec<ZombieNodeSpec>,
}

/// A parachain section of a Zombie launch specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParachainSpec {
    /// The parachain id.
    pub id: u32,
    /// Collator nodes for this parachain.
    pub collators: Vec<ZombieNodeSpec>,
}

/// One node entry in a Zombie launch specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZombieNodeSpec {
    /// Unique node name within the network.
    pub name: String,
    /// Binary override for this node; falls back to the relay default.
    #[serde(default)]
    pub command: Option<PathBuf>,
    /// Extra arguments for this node.
    #[serde(default)]
    pub args: Vec<String>,
    /// Pinned websocket port; a free port is picked when absent.
    #[serde(default)]
    pub ws_port: Option<u16>,
    /// Override for the readiness log pattern (a regular expression).
    #[serde(default)]
    pub ready_pattern: Option<String>,
}

/// Declarative description of one chain-client provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider name, unique within an environment.
    pub name: String,
    /// The client flavor to instantiate.
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Connection URLs; the first entry is used.
    pub endpoints: Vec<String>,
}

/// The closed set of supported chain-client flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderKind {
    /// Raw Substrate JSON-RPC over websocket.
    SubstrateWs,
    /// Typed Substrate client (subxt).
    Subxt,
    /// Ethereum JSON-RPC over websocket.
    EthWs,
    /// Ethereum JSON-RPC over HTTP.
    EthHttp,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::SubstrateWs => "substrateWs",
            Self::Subxt => "subxt",
            Self::EthWs => "ethWs",
            Self::EthHttp => "ethHttp",
        };
        f.write_str(label)
    }
}

/// Retry/backoff policy for provider connection establishment.
///
/// The defaults mirror the reference behavior: a hard ceiling of 150
/// attempts, each racing a 10s timeout, with a fixed 100ms delay between
/// attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum connection attempts per provider (hard ceiling).
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// How many providers of a batch may connect concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_retry_attempts() -> u32 {
    150
}
fn default_attempt_timeout_ms() -> u64 {
    10_000
}
fn default_backoff_ms() -> u64 {
    100
}
fn default_concurrency() -> usize {
    1
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            backoff_ms: default_backoff_ms(),
            concurrency: default_concurrency(),
        }
    }
}

/// One named test environment: a foundation plus the providers to connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Environment name, selected via `PLINTH_TEST_ENV`.
    pub name: String,
    /// The foundation to provision.
    pub foundation: FoundationConfig,
    /// Providers connected once the foundation is running.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    /// Connection retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// The top-level environment configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentsFile {
    /// All declared environments.
    pub environments: Vec<EnvironmentConfig>,
}

impl EnvironmentsFile {
    /// Finds an environment by name.
    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foundation_config_is_tag_discriminated() {
        let raw = r#"{
            "type": "dev",
            "binPath": "/usr/local/bin/node-template",
            "name": "local-dev",
            "ports": { "wsPort": 9944 }
        }"#;
        let cfg: FoundationConfig = serde_json::from_str(raw).unwrap();
        match cfg {
            FoundationConfig::Dev(dev) => {
                assert_eq!(dev.name, "local-dev");
                assert_eq!(dev.ports.ws_port, Some(9944));
                assert_eq!(dev.ports.rpc_port, None);
                assert!(dev.options.is_none());
            }
            other => panic!("expected dev foundation, got {:?}", other),
        }
    }

    #[test]
    fn retry_policy_defaults_match_reference_constants() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy.attempts, 150);
        assert_eq!(policy.attempt_timeout_ms, 10_000);
        assert_eq!(policy.backoff_ms, 100);
        assert_eq!(policy.concurrency, 1);
    }

    #[test]
    fn provider_kind_round_trips_camel_case() {
        let raw = r#"{ "name": "para", "type": "substrateWs", "endpoints": ["ws://127.0.0.1:9944"] }"#;
        let cfg: ProviderConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.kind, ProviderKind::SubstrateWs);
        let back = serde_json::to_value(&cfg).unwrap();
        assert_eq!(back["type"], "substrateWs");
    }

    #[test]
    fn zombie_spec_parses_parachains() {
        let raw = r#"{
            "relaychain": {
                "chain": "rococo-local",
                "defaultCommand": "/bins/polkadot",
                "nodes": [ { "name": "alice" }, { "name": "bob", "wsPort": 9955 } ]
            },
            "parachains": [
                { "id": 2000, "collators": [ { "name": "collator01", "command": "/bins/collator" } ] }
            ]
        }"#;
        let spec: ZombieNetworkSpec = serde_json::from_str(raw).unwrap();
        assert_eq!(spec.relaychain.nodes.len(), 2);
        assert_eq!(spec.parachains[0].id, 2000);
        assert_eq!(spec.relaychain.nodes[1].ws_port, Some(9955));
    }
}
