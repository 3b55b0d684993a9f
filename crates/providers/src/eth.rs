// Path: crates/providers/src/eth.rs

//! Ethereum JSON-RPC client flavors: websocket and HTTP.

use crate::connector::{ChainClient, Connector};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};

/// Ethereum JSON-RPC over websocket.
pub struct EthWsConnector;

#[async_trait]
impl Connector for EthWsConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ChainClient>, String> {
        let inner = WsClientBuilder::default()
            .build(endpoint)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Box::new(EthWsClient { inner }))
    }
}

struct EthWsClient {
    inner: WsClient,
}

#[async_trait]
impl ChainClient for EthWsClient {
    async fn health_check(&self) -> Result<(), String> {
        let _: serde_json::Value = self
            .inner
            .request("eth_chainId", ArrayParams::new())
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

/// Ethereum JSON-RPC over HTTP.
pub struct EthHttpConnector {
    http: reqwest::Client,
}

impl EthHttpConnector {
    /// A connector with a fresh HTTP client.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for EthHttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for EthHttpConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ChainClient>, String> {
        let client = EthHttpClient {
            http: self.http.clone(),
            url: endpoint.to_string(),
        };
        // HTTP is connectionless; perform the handshake the contract promises
        // by completing one probe round trip before handing the client out.
        client.health_check().await?;
        Ok(Box::new(client))
    }
}

struct EthHttpClient {
    http: reqwest::Client,
    url: String,
}

impl EthHttpClient {
    async fn rpc(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, String> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response: serde_json::Value = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        if let Some(error) = response.get("error") {
            return Err(format!("rpc error from {}: {error}", self.url));
        }
        Ok(response
            .get("result")
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl ChainClient for EthHttpClient {
    async fn health_check(&self) -> Result<(), String> {
        self.rpc("eth_chainId", Vec::new()).await.map(|_| ())
    }

    async fn raw_request(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, String> {
        self.rpc(method, params).await
    }
}
