// Path: crates/providers/src/substrate.rs

//! Substrate client flavors: raw websocket JSON-RPC and the typed subxt
//! client.

use crate::connector::{ChainClient, Connector};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

/// Raw Substrate JSON-RPC over websocket.
pub struct SubstrateWsConnector;

#[async_trait]
impl Connector for SubstrateWsConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ChainClient>, String> {
        let inner = WsClientBuilder::default()
            .build(endpoint)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Box::new(SubstrateWsClient { inner }))
    }
}

struct SubstrateWsClient {
    inner: WsClient,
}

#[async_trait]
impl ChainClient for SubstrateWsClient {
    async fn health_check(&self) -> Result<(), String> {
        let _: serde_json::Value = self
            .inner
            .request("system_health", ArrayParams::new())
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn raw_request(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, String> {
        let mut array = ArrayParams::new();
        for value in params {
            array.insert(value).map_err(|e| e.to_string())?;
        }
        self.inner
            .request(method, array)
            .await
            .map_err(|e| e.to_string())
    }
}

/// The typed Substrate client (subxt).
pub struct SubxtConnector;

#[async_trait]
impl Connector for SubxtConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ChainClient>, String> {
        let inner = subxt::OnlineClient::<subxt::SubstrateConfig>::from_url(endpoint)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Box::new(SubxtClient { inner }))
    }
}

struct SubxtClient {
    inner: subxt::OnlineClient<subxt::SubstrateConfig>,
}

#[async_trait]
impl ChainClient for SubxtClient {
    async fn health_check(&self) -> Result<(), String> {
        self.inner
            .blocks()
            .at_latest()
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn raw_request(
        &self,
        method: &str,
        _params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, String> {
        Err(format!(
            "the typed subxt client does not expose raw JSON-RPC (requested '{method}'); use a substrateWs provider"
        ))
    }
}
