// Path: crates/types/src/status.rs

//! Status unions and the running-network data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status of a foundation service. Exactly one instance exists per
/// service; transitions are the only legal way to move between states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FoundationStatus {
    /// No resources are provisioned.
    Stopped,
    /// `start()` is in flight.
    Starting,
    /// The foundation is up and reachable.
    #[serde(rename_all = "camelCase")]
    Running {
        /// Endpoints the network exposes, one per node.
        endpoints: Vec<String>,
        /// How many nodes the foundation manages.
        node_count: usize,
    },
    /// The most recent `start()` failed. Not terminal: a subsequent
    /// `start()` resets state.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// The rendered startup error.
        error: String,
    },
}

impl FoundationStatus {
    /// True when the foundation is `Running`.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// A short lowercase label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running { .. } => "running",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Lifecycle status of the provider connection manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ProviderServiceStatus {
    /// No providers have been created.
    Idle,
    /// A `connect()` batch is in flight.
    #[serde(rename_all = "camelCase")]
    Connecting {
        /// Batch size.
        total: usize,
        /// How many providers have connected so far.
        connected: usize,
    },
    /// All providers of the batch connected successfully.
    #[serde(rename_all = "camelCase")]
    Connected {
        /// Batch size (all connected).
        connected: usize,
        /// The endpoints in use, one per provider.
        endpoints: Vec<String>,
    },
    /// `disconnect()` completed (possibly best-effort).
    Disconnected,
    /// A `connect()` batch failed after rollback.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// The rendered connection error.
        error: String,
    },
}

impl ProviderServiceStatus {
    /// True when the service is `Connected`.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// A short lowercase label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting { .. } => "connecting",
            Self::Connected { .. } => "connected",
            Self::Disconnected => "disconnected",
            Self::Failed { .. } => "failed",
        }
    }
}

/// The role a node plays within its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeRole {
    /// A relay chain validator.
    Relaychain,
    /// A parachain collator.
    Parachain,
    /// A standalone binary (Dev / Chopsticks).
    Binary,
}

/// Read-only description of one running node, produced at start time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Unique node name within the foundation.
    pub name: String,
    /// The node's role.
    pub role: NodeRole,
    /// Websocket endpoint for this node.
    pub ws_endpoint: String,
    /// P2P multiaddress, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_address: Option<String>,
    /// Parachain id for collators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parachain_id: Option<u32>,
}

/// Produced once on a successful `start()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningInfo {
    /// Endpoints the network exposes.
    pub endpoints: Vec<String>,
    /// The network's temporary working directory, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// All nodes managed by the foundation.
    pub nodes: Vec<NodeInfo>,
    /// Path to the control-channel socket, when the topology exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_socket: Option<PathBuf>,
}
