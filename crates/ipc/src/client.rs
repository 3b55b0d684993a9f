// Path: crates/ipc/src/client.rs

//! The control-channel client.
//!
//! Clients open a fresh connection per command, write one JSON request,
//! half-close, and read the single JSON response to EOF. Transport failures
//! (socket missing, connection refused) surface as typed
//! [`NodeOperationError`]s; command-level failures arrive as `failure`
//! responses and are mapped to the same error type with the server's message.

use crate::protocol::{ControlCommand, ControlRequest, ControlResponse, ResponseStatus};
use plinth_types::NodeOperationError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

/// Upper bound on one request/response round trip.
const ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(10);

/// A client for a running network's control socket.
#[derive(Debug, Clone)]
pub struct ControlClient {
    socket_path: PathBuf,
}

impl ControlClient {
    /// A client for the socket at `socket_path`. No connection is made until
    /// a command is sent.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// The socket path this client targets.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends one request and returns the raw response.
    pub async fn send(&self, request: &ControlRequest) -> Result<ControlResponse, NodeOperationError> {
        let op = request.cmd.to_string();
        let node = request.node_name.clone().unwrap_or_default();
        let fail = |reason: String| NodeOperationError::new(op.clone(), node.clone(), reason);

        let round_trip = async {
            let mut stream = UnixStream::connect(&self.socket_path)
                .await
                .map_err(|e| format!("control socket {}: {e}", self.socket_path.display()))?;
            let body = serde_json::to_vec(request).map_err(|e| e.to_string())?;
            stream.write_all(&body).await.map_err(|e| e.to_string())?;
            stream.shutdown().await.map_err(|e| e.to_string())?;

            let mut raw = Vec::new();
            stream
                .read_to_end(&mut raw)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::from_slice::<ControlResponse>(&raw)
                .map_err(|e| format!("malformed control response: {e}"))
        };

        match timeout(ROUND_TRIP_TIMEOUT, round_trip).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(reason)) => Err(fail(reason)),
            Err(_) => Err(fail("control round trip timed out".into())),
        }
    }

    /// Sends `cmd` for `node_name` and requires a `success` response.
    async fn expect_success(
        &self,
        cmd: ControlCommand,
        node_name: &str,
    ) -> Result<ControlResponse, NodeOperationError> {
        let response = self
            .send(&ControlRequest::new(cmd, Some(node_name)))
            .await?;
        match response.status {
            ResponseStatus::Success => Ok(response),
            ResponseStatus::Failure => Err(NodeOperationError::new(
                cmd.to_string(),
                node_name,
                response.message,
            )),
        }
    }

    /// Queries a node's liveness.
    pub async fn is_up(&self, node_name: &str) -> Result<bool, NodeOperationError> {
        let response = self.expect_success(ControlCommand::Isup, node_name).await?;
        Ok(response.result.as_bool().unwrap_or(false))
    }

    /// Restarts a node from its relaunch spec. Does not require the node to
    /// be alive beforehand.
    pub async fn restart_node(&self, node_name: &str) -> Result<(), NodeOperationError> {
        self.expect_success(ControlCommand::Restart, node_name)
            .await
            .map(|_| ())
    }

    /// Suspends a node's process.
    pub async fn pause_node(&self, node_name: &str) -> Result<(), NodeOperationError> {
        self.expect_success(ControlCommand::Pause, node_name)
            .await
            .map(|_| ())
    }

    /// Resumes a suspended node's process and waits for it to report ready.
    pub async fn resume_node(&self, node_name: &str) -> Result<(), NodeOperationError> {
        self.expect_success(ControlCommand::Resume, node_name)
            .await
            .map(|_| ())
    }

    /// Kills a node's process and removes it from the process table.
    pub async fn kill_node(&self, node_name: &str) -> Result<(), NodeOperationError> {
        self.expect_success(ControlCommand::Kill, node_name)
            .await
            .map(|_| ())
    }

    /// Returns the node name → pid map of the running network.
    pub async fn network_map(
        &self,
    ) -> Result<serde_json::Map<String, serde_json::Value>, NodeOperationError> {
        let response = self
            .send(&ControlRequest::new(ControlCommand::Networkmap, None))
            .await?;
        match response.status {
            ResponseStatus::Success => match response.result {
                serde_json::Value::Object(map) => Ok(map),
                other => Err(NodeOperationError::new(
                    "networkmap",
                    "",
                    format!("unexpected networkmap payload: {other}"),
                )),
            },
            ResponseStatus::Failure => {
                Err(NodeOperationError::new("networkmap", "", response.message))
            }
        }
    }
}
