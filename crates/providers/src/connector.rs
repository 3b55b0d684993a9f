// Path: crates/providers/src/connector.rs

//! The seams between the connection manager and the concrete client flavors.

use async_trait::async_trait;
use plinth_types::config::{ENDPOINT_ENV_VAR, ENDPOINT_FROM_ENV};
use plinth_types::ProviderKind;

/// A live, connected chain client. Exactly one successful handshake has
/// happened before a value of this type exists.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Lightweight liveness probe (a metadata or chain-id round trip).
    async fn health_check(&self) -> Result<(), String>;

    /// Issues a raw JSON-RPC request over the live connection. Typed clients
    /// that do not expose a raw surface return an error.
    async fn raw_request(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, String>;

    /// Graceful teardown ahead of the client being dropped. The transport is
    /// closed by dropping; this exists so flavors with an explicit goodbye
    /// can report failures.
    async fn disconnect(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Establishes connections for one client flavor.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Attempts a single connection handshake against `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ChainClient>, String>;
}

/// Builds connectors per flavor. The seam tests use to inject deterministic
/// connectors.
pub trait ConnectorFactory: Send + Sync {
    /// The connector for `kind`.
    fn connector(&self, kind: ProviderKind) -> Box<dyn Connector>;
}

/// The production factory covering every [`ProviderKind`].
#[derive(Debug, Default)]
pub struct DefaultConnectorFactory;

impl ConnectorFactory for DefaultConnectorFactory {
    fn connector(&self, kind: ProviderKind) -> Box<dyn Connector> {
        match kind {
            ProviderKind::SubstrateWs => Box::new(crate::substrate::SubstrateWsConnector),
            ProviderKind::Subxt => Box::new(crate::substrate::SubxtConnector),
            ProviderKind::EthWs => Box::new(crate::eth::EthWsConnector),
            ProviderKind::EthHttp => Box::new(crate::eth::EthHttpConnector::new()),
        }
    }
}

/// Resolves the endpoint sentinel: `"from-env"` is replaced by the
/// `PLINTH_ENDPOINT` process environment variable.
pub fn resolve_endpoint(endpoint: &str) -> Result<String, String> {
    if endpoint == ENDPOINT_FROM_ENV {
        std::env::var(ENDPOINT_ENV_VAR)
            .map_err(|_| format!("endpoint sentinel '{ENDPOINT_FROM_ENV}' used but {ENDPOINT_ENV_VAR} is not set"))
    } else {
        Ok(endpoint.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_endpoints_pass_through() {
        assert_eq!(
            resolve_endpoint("ws://127.0.0.1:9944").unwrap(),
            "ws://127.0.0.1:9944"
        );
    }

    #[test]
    fn sentinel_requires_the_env_var() {
        std::env::remove_var(ENDPOINT_ENV_VAR);
        assert!(resolve_endpoint(ENDPOINT_FROM_ENV).is_err());

        std::env::set_var(ENDPOINT_ENV_VAR, "ws://10.0.0.1:9944");
        assert_eq!(
            resolve_endpoint(ENDPOINT_FROM_ENV).unwrap(),
            "ws://10.0.0.1:9944"
        );
        std::env::remove_var(ENDPOINT_ENV_VAR);
    }
}
