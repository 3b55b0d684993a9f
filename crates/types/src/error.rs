// Path: crates/types/src/error.rs

//! Core error types for the plinth harness.

use crate::config::ProviderKind;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by foundation services.
///
/// Expected failure paths (timeouts, retry exhaustion, missing binaries) are
/// modeled as values; abrupt termination is reserved for true invariant
/// violations.
#[derive(Debug, Error)]
pub enum FoundationError {
    /// The topology failed to reach `Running`: missing binary, config load
    /// failure, launch failure, or readiness timeout. The reason names the
    /// missing resource and, for readiness timeouts, carries the accumulated
    /// process log output.
    #[error("foundation startup failed: {reason}")]
    Startup {
        /// What went wrong, naming the offending resource.
        reason: String,
    },
    /// Teardown of a running foundation failed. Teardown is collect-and-
    /// continue: the service still reaches `Stopped`, and this error reports
    /// what misbehaved along the way.
    #[error("foundation shutdown failed: {reason}")]
    Shutdown {
        /// The collected teardown failures.
        reason: String,
    },
    /// The liveness probe failed, or a health check was attempted while the
    /// foundation was not `Running`. Health checks never mutate state.
    #[error("foundation health check failed: {reason}")]
    HealthCheck {
        /// Why the probe failed.
        reason: String,
    },
}

impl ErrorCode for FoundationError {
    fn code(&self) -> &'static str {
        match self {
            Self::Startup { .. } => "FOUNDATION_STARTUP_FAILED",
            Self::Shutdown { .. } => "FOUNDATION_SHUTDOWN_FAILED",
            Self::HealthCheck { .. } => "FOUNDATION_HEALTH_CHECK_FAILED",
        }
    }
}

/// Errors raised by the provider connection manager.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A provider failed to connect after exhausting its retry ceiling.
    #[error("provider '{name}' ({kind}) failed to connect to {endpoint} after {attempts} attempts")]
    Connection {
        /// Provider name from configuration.
        name: String,
        /// The client flavor that failed.
        kind: ProviderKind,
        /// The endpoint that was attempted.
        endpoint: String,
        /// How many attempts were made before giving up.
        attempts: u32,
    },
    /// One or more providers failed to disconnect cleanly. The service still
    /// transitions to `Disconnected`; this reports the offenders.
    #[error("failed to disconnect providers: {names}")]
    Disconnect {
        /// Comma-joined names of the providers that failed to disconnect.
        names: String,
    },
    /// A connected provider did not respond to its liveness probe.
    #[error("health check failed for provider '{name}' ({kind}) at {endpoint}: {reason}")]
    HealthCheck {
        /// Provider name.
        name: String,
        /// The client flavor.
        kind: ProviderKind,
        /// The endpoint probed.
        endpoint: String,
        /// Why the probe failed.
        reason: String,
    },
    /// An operation that requires `Connected` status was attempted while the
    /// service was not connected. No I/O is performed in this case.
    #[error("provider service is not connected (status: {status})")]
    NotConnected {
        /// The status the service was actually in.
        status: String,
    },
}

impl ErrorCode for ProviderError {
    fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "PROVIDER_CONNECTION_FAILED",
            Self::Disconnect { .. } => "PROVIDER_DISCONNECT_FAILED",
            Self::HealthCheck { .. } => "PROVIDER_HEALTH_CHECK_FAILED",
            Self::NotConnected { .. } => "PROVIDER_NOT_CONNECTED",
        }
    }
}

/// An IPC-mediated node command failed: the foundation was not running, the
/// node name was unknown, or the transport itself errored.
#[derive(Debug, Error)]
#[error("node operation '{operation}' failed for '{node_name}': {reason}")]
pub struct NodeOperationError {
    /// The attempted operation (`restart`, `pause`, `resume`, `kill`, `isup`).
    pub operation: String,
    /// The targeted node name.
    pub node_name: String,
    /// Why the operation failed.
    pub reason: String,
}

impl NodeOperationError {
    /// Builds a `NodeOperationError` from its parts.
    pub fn new(
        operation: impl Into<String>,
        node_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            node_name: node_name.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for NodeOperationError {
    fn code(&self) -> &'static str {
        "NODE_OPERATION_FAILED"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let e = FoundationError::Startup {
            reason: "missing binary /bins/polkadot".into(),
        };
        assert_eq!(e.code(), "FOUNDATION_STARTUP_FAILED");
        assert!(e.to_string().contains("/bins/polkadot"));

        let e = ProviderError::NotConnected {
            status: "idle".into(),
        };
        assert_eq!(e.code(), "PROVIDER_NOT_CONNECTED");

        let e = NodeOperationError::new("restart", "bob", "socket refused");
        assert_eq!(e.code(), "NODE_OPERATION_FAILED");
        assert!(e.to_string().contains("restart"));
        assert!(e.to_string().contains("bob"));
    }
}
