// Path: crates/ipc/src/protocol.rs

//! Wire types for the control channel.
//!
//! The protocol is bit-exact: one JSON object per request, one per response,
//! no framing beyond the connection itself. The client half-closes its write
//! side after the request; both sides read to EOF.

use serde::{Deserialize, Serialize};

/// The commands a control channel accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    /// Restart the process backing a node.
    Restart,
    /// Suspend a node's process.
    Pause,
    /// Resume a suspended node's process.
    Resume,
    /// Terminate a node's process and drop it from the process table.
    Kill,
    /// Query a node's liveness without mutating state.
    Isup,
    /// Return the map of node name to tracked pid.
    Networkmap,
}

impl std::fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Restart => "restart",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Kill => "kill",
            Self::Isup => "isup",
            Self::Networkmap => "networkmap",
        };
        f.write_str(label)
    }
}

/// A control request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    /// Free-form description of the request, echoed in logs.
    pub text: String,
    /// The command to execute.
    pub cmd: ControlCommand,
    /// The targeted node, required by every command except `networkmap`.
    #[serde(rename = "nodeName", skip_serializing_if = "Option::is_none", default)]
    pub node_name: Option<String>,
}

impl ControlRequest {
    /// Builds a request for `cmd`, targeting `node_name` when given.
    pub fn new(cmd: ControlCommand, node_name: Option<&str>) -> Self {
        let text = match node_name {
            Some(name) => format!("{cmd} {name}"),
            None => cmd.to_string(),
        };
        Self {
            text,
            cmd,
            node_name: node_name.map(str::to_owned),
        }
    }
}

/// Outcome discriminator of a control response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The command was executed.
    Success,
    /// The command was understood but could not be executed (unknown node,
    /// signal failure). Never a transport-level error.
    Failure,
}

/// A control response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Whether the command succeeded.
    pub status: ResponseStatus,
    /// Command-specific payload: a boolean for most commands, an object for
    /// `networkmap`.
    pub result: serde_json::Value,
    /// Human-readable outcome description.
    pub message: String,
}

impl ControlResponse {
    /// A success response carrying `result`.
    pub fn success(result: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            result,
            message: message.into(),
        }
    }

    /// A failure response; `result` is `false`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            result: serde_json::Value::Bool(false),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape_is_exact() {
        let req = ControlRequest::new(ControlCommand::Isup, Some("alice"));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "text": "isup alice", "cmd": "isup", "nodeName": "alice" })
        );

        let req = ControlRequest::new(ControlCommand::Networkmap, None);
        let value = serde_json::to_value(&req).unwrap();
        // nodeName must be absent, not null.
        assert_eq!(
            value,
            serde_json::json!({ "text": "networkmap", "cmd": "networkmap" })
        );
    }

    #[test]
    fn response_wire_shape_is_exact() {
        let resp = ControlResponse::success(serde_json::Value::Bool(true), "node 'alice' is up");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["result"], true);

        let resp = ControlResponse::failure("unknown node 'mallory'");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["result"], false);
    }

    #[test]
    fn unknown_command_fails_to_parse() {
        let raw = r#"{ "text": "explode alice", "cmd": "explode", "nodeName": "alice" }"#;
        assert!(serde_json::from_str::<ControlRequest>(raw).is_err());
    }
}
