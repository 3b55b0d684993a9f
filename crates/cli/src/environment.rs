// Path: crates/cli/src/environment.rs

//! The orchestration context: one foundation, one provider service, one test
//! run.
//!
//! An [`Environment`] is an owned value threaded through call sites — there
//! is no global instance. It owns exactly one foundation service and one
//! provider connection manager for its lifetime and serializes all lifecycle
//! operations through exclusive ownership.

use anyhow::{anyhow, bail, Context, Result};
use plinth_foundations::{Foundation, FoundationVariant};
use plinth_ipc::ControlClient;
use plinth_providers::{ConnectorFactory, ProviderService};
use plinth_types::{
    EnvironmentConfig, FoundationConfig, FoundationStatus, NodeOperationError,
    ProviderConfig, ProviderServiceStatus, RunningInfo,
};
use std::sync::Arc;

/// An environment-scoped orchestration context.
pub struct Environment {
    name: String,
    foundation: FoundationVariant,
    providers: ProviderService,
    provider_configs: Vec<ProviderConfig>,
    run_info: Option<RunningInfo>,
    stop_handle: Option<plinth_foundations::StopHandle>,
}

impl Environment {
    /// Builds the context for one environment configuration.
    pub fn from_config(config: EnvironmentConfig) -> Self {
        // A read-only foundation's connection descriptors double as its
        // provider set.
        let mut provider_configs = config.providers.clone();
        if let FoundationConfig::ReadOnly(ro) = &config.foundation {
            provider_configs.extend(ro.connections.iter().cloned());
        }

        Self {
            name: config.name.clone(),
            foundation: FoundationVariant::from_config(config.foundation),
            providers: ProviderService::new(config.retry),
            provider_configs,
            run_info: None,
            stop_handle: None,
        }
    }

    /// Replaces the provider connector factory (test seam).
    pub fn with_connector_factory(
        mut self,
        retry: plinth_types::RetryPolicy,
        factory: Arc<dyn ConnectorFactory>,
    ) -> Self {
        self.providers = ProviderService::with_factory(retry, factory);
        self
    }

    /// The environment's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The foundation's topology label.
    pub fn topology(&self) -> &'static str {
        self.foundation.topology()
    }

    /// Starts the foundation and records its running description.
    pub async fn start(&mut self) -> Result<&RunningInfo> {
        let outcome = self
            .foundation
            .start()
            .await
            .with_context(|| format!("environment '{}' failed to start", self.name))?;
        self.run_info = Some(outcome.info);
        self.stop_handle = Some(outcome.stop);
        // The run cell and status are shared; either teardown path works.
        self.run_info
            .as_ref()
            .ok_or_else(|| anyhow!("running info vanished after start"))
    }

    /// Connects the environment's providers to the running network.
    pub async fn connect(&mut self) -> Result<()> {
        let created = self.providers.create_providers(&self.provider_configs);
        log::info!("connecting {created} provider(s) for environment '{}'", self.name);
        self.providers
            .connect()
            .await
            .with_context(|| format!("environment '{}' failed to connect providers", self.name))?;
        Ok(())
    }

    /// Disconnects all providers (best-effort, aggregated errors).
    pub async fn disconnect(&mut self) -> Result<()> {
        self.providers.disconnect().await?;
        Ok(())
    }

    /// Tears the whole environment down: providers first, then the
    /// foundation. Both steps always run; failures are collected and
    /// reported together.
    pub async fn destroy(&mut self) -> Result<()> {
        let mut failures: Vec<String> = Vec::new();

        if let Err(e) = self.providers.disconnect().await {
            failures.push(e.to_string());
        }
        if let Err(e) = self.foundation.stop().await {
            failures.push(e.to_string());
        }
        self.run_info = None;
        self.stop_handle = None;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!(
                "environment '{}' teardown reported: {}",
                self.name,
                failures.join("; ")
            ))
        }
    }

    /// The foundation's lifecycle status.
    pub fn foundation_status(&self) -> FoundationStatus {
        self.foundation.status()
    }

    /// The provider service's status.
    pub fn provider_status(&self) -> &ProviderServiceStatus {
        self.providers.status()
    }

    /// The running description, when started.
    pub fn run_info(&self) -> Option<&RunningInfo> {
        self.run_info.as_ref()
    }

    /// The provider service, for direct queries.
    pub fn providers(&self) -> &ProviderService {
        &self.providers
    }

    /// Releases the one-shot stop capability of the current start call, for
    /// callers that want teardown scoped to that call rather than the
    /// service-level `destroy`.
    pub fn take_stop_handle(&mut self) -> Option<plinth_foundations::StopHandle> {
        self.stop_handle.take()
    }

    /// Probes the whole environment. A read-only foundation degrades to a
    /// provider-level check; every other topology is probed itself, plus its
    /// providers when any are connected.
    pub async fn health_check(&self) -> Result<()> {
        match &self.foundation {
            FoundationVariant::ReadOnly(_) => self.providers.health_check().await?,
            _ => {
                self.foundation.health_check().await?;
                if self.providers.status().is_connected() {
                    self.providers.health_check().await?;
                }
            }
        }
        Ok(())
    }

    // --- Node control (Zombie networks) ---

    fn control_client(&self, operation: &str, node: &str) -> Result<ControlClient, NodeOperationError> {
        let socket = self
            .run_info
            .as_ref()
            .and_then(|info| info.control_socket.as_ref());
        match socket {
            Some(socket) => Ok(ControlClient::new(socket)),
            None => Err(NodeOperationError::new(
                operation,
                node,
                "foundation is not a running network with a control channel",
            )),
        }
    }

    /// Restarts a node of the running network.
    pub async fn restart_node(&self, node: &str) -> Result<(), NodeOperationError> {
        self.control_client("restart", node)?.restart_node(node).await
    }

    /// Pauses a node of the running network.
    pub async fn pause_node(&self, node: &str) -> Result<(), NodeOperationError> {
        self.control_client("pause", node)?.pause_node(node).await
    }

    /// Resumes a node of the running network.
    pub async fn resume_node(&self, node: &str) -> Result<(), NodeOperationError> {
        self.control_client("resume", node)?.resume_node(node).await
    }

    /// Kills a node of the running network.
    pub async fn kill_node(&self, node: &str) -> Result<(), NodeOperationError> {
        self.control_client("kill", node)?.kill_node(node).await
    }

    /// Probes a node of the running network.
    pub async fn is_up(&self, node: &str) -> Result<bool, NodeOperationError> {
        self.control_client("isup", node)?.is_up(node).await
    }

    // --- Block control (Chopsticks) ---
    //
    // These ride the connected provider's live websocket as JSON-RPC calls,
    // not the IPC control channel.

    async fn raw_rpc(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let provider = self
            .providers
            .all_providers()
            .iter()
            .find(|p| p.client().is_some())
            .ok_or_else(|| anyhow!("no connected provider to carry '{method}'"))?;
        let client = provider
            .client()
            .ok_or_else(|| anyhow!("provider '{}' already disconnected", provider.name))?;
        client
            .raw_request(method, params)
            .await
            .map_err(|reason| anyhow!("'{method}' via provider '{}': {reason}", provider.name))
    }

    /// Produces `count` blocks on a chopsticks node.
    pub async fn create_block(&self, count: u32) -> Result<serde_json::Value> {
        self.raw_rpc("dev_newBlock", vec![serde_json::json!({ "count": count })])
            .await
    }

    /// Mutates storage on a chopsticks node.
    pub async fn set_storage(&self, values: serde_json::Value) -> Result<serde_json::Value> {
        self.raw_rpc("dev_setStorage", vec![values]).await
    }

    /// Reads a block (the head when `hash` is `None`).
    pub async fn get_block(&self, hash: Option<&str>) -> Result<serde_json::Value> {
        let params = match hash {
            Some(hash) => vec![serde_json::Value::String(hash.to_string())],
            None => Vec::new(),
        };
        self.raw_rpc("chain_getBlock", params).await
    }

    /// Rewinds a chopsticks node's head to `hash`.
    pub async fn set_head(&self, hash: &str) -> Result<serde_json::Value> {
        self.raw_rpc("dev_setHead", vec![serde_json::Value::String(hash.to_string())])
            .await
    }

    /// Fails unless every provider-facing precondition for block control
    /// holds; used by callers that want a clear error before issuing ops.
    pub fn ensure_connected(&self) -> Result<()> {
        if self.providers.status().is_connected() {
            Ok(())
        } else {
            bail!(
                "environment '{}' has no connected providers (status: {})",
                self.name,
                self.providers.status().label()
            )
        }
    }
}
