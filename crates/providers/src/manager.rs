// Path: crates/providers/src/manager.rs

//! The provider connection manager.

use crate::connector::{resolve_endpoint, ChainClient, ConnectorFactory, DefaultConnectorFactory};
use futures_util::stream::StreamExt;
use plinth_types::{ProviderConfig, ProviderError, ProviderKind, ProviderServiceStatus, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// A declarative provider descriptor awaiting connection. Building one is
/// pure and performs no I/O.
#[derive(Debug, Clone)]
struct LazyProvider {
    name: String,
    kind: ProviderKind,
    endpoints: Vec<String>,
}

/// A provider that has completed exactly one successful handshake.
/// `disconnect` is idempotent.
pub struct ConnectedProvider {
    /// Provider name from configuration.
    pub name: String,
    /// The client flavor.
    pub kind: ProviderKind,
    /// The resolved endpoint in use.
    pub endpoint: String,
    client: Option<Box<dyn ChainClient>>,
}

impl ConnectedProvider {
    /// The live client handle, `None` once disconnected.
    pub fn client(&self) -> Option<&dyn ChainClient> {
        self.client.as_deref()
    }

    /// Disconnects the provider. Calling it again is a no-op.
    pub async fn disconnect(&mut self) -> Result<(), String> {
        match self.client.take() {
            Some(client) => {
                let outcome = client.disconnect().await;
                // The transport itself closes when the client drops here,
                // regardless of what the goodbye reported.
                drop(client);
                outcome
            }
            None => Ok(()),
        }
    }
}

/// Summary of a successful `connect()` batch.
#[derive(Debug, Clone)]
pub struct ConnectSummary {
    /// Names of the connected providers, in configuration order.
    pub connected: Vec<String>,
    /// The resolved endpoints, in configuration order.
    pub endpoints: Vec<String>,
}

/// Establishes and supervises connections to chain clients with retry,
/// timeout, and partial-failure rollback semantics.
///
/// One mutable state cell per instance: callers serialize `connect`/
/// `disconnect` through exclusive ownership, and the disconnect capability is
/// the owning service itself.
pub struct ProviderService {
    status: ProviderServiceStatus,
    lazy: Vec<LazyProvider>,
    connected: Vec<ConnectedProvider>,
    retry: RetryPolicy,
    factory: Arc<dyn ConnectorFactory>,
}

impl ProviderService {
    /// A service using the production connector factory.
    pub fn new(retry: RetryPolicy) -> Self {
        Self::with_factory(retry, Arc::new(DefaultConnectorFactory))
    }

    /// A service with a custom connector factory (the test seam).
    pub fn with_factory(retry: RetryPolicy, factory: Arc<dyn ConnectorFactory>) -> Self {
        Self {
            status: ProviderServiceStatus::Idle,
            lazy: Vec::new(),
            connected: Vec::new(),
            retry,
            factory,
        }
    }

    /// Builds lazy provider descriptors without connecting. Pure and
    /// non-blocking; returns how many descriptors were created.
    pub fn create_providers(&mut self, configs: &[ProviderConfig]) -> usize {
        self.lazy = configs
            .iter()
            .map(|c| LazyProvider {
                name: c.name.clone(),
                kind: c.kind,
                endpoints: c.endpoints.clone(),
            })
            .collect();
        tracing::debug!(target: "providers", "created {} lazy provider(s)", self.lazy.len());
        self.lazy.len()
    }

    /// Connects every created provider.
    ///
    /// Providers are attempted in configuration order, up to
    /// `retry.concurrency` of them concurrently; retries for one provider are
    /// sequential and do not block the others. If any provider exhausts its
    /// retry ceiling, every provider that connected earlier in the batch is
    /// disconnected — in the order they connected — before the error is
    /// returned, and the service lands in `Failed`. Callers never observe a
    /// partially-connected state as success.
    pub async fn connect(&mut self) -> Result<ConnectSummary, ProviderError> {
        let total = self.lazy.len();
        self.status = ProviderServiceStatus::Connecting {
            total,
            connected: 0,
        };
        self.connected.clear();

        let retry = self.retry.clone();
        let factory = self.factory.clone();
        let attempts = self
            .lazy
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, lazy)| {
                let factory = factory.clone();
                let retry = retry.clone();
                async move { (index, connect_with_retry(factory, lazy, retry).await) }
            })
            .collect::<Vec<_>>();

        let mut stream =
            futures_util::stream::iter(attempts).buffered(retry.concurrency.max(1));

        // Successes in connection (completion) order, for rollback.
        let mut successes: Vec<(usize, ConnectedProvider)> = Vec::new();
        let mut first_error: Option<ProviderError> = None;

        while let Some((index, outcome)) = stream.next().await {
            match outcome {
                Ok(provider) => {
                    tracing::info!(
                        target: "providers",
                        "provider '{}' connected to {}",
                        provider.name,
                        provider.endpoint
                    );
                    successes.push((index, provider));
                    self.status = ProviderServiceStatus::Connecting {
                        total,
                        connected: successes.len(),
                    };
                }
                Err(e) => {
                    tracing::warn!(target: "providers", "provider connection failed: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        drop(stream);

        if let Some(error) = first_error {
            // Rollback: disconnect in the order the providers connected.
            for (_, mut provider) in successes {
                if let Err(e) = provider.disconnect().await {
                    tracing::warn!(
                        target: "providers",
                        "rollback disconnect of '{}' failed: {e}",
                        provider.name
                    );
                }
            }
            self.status = ProviderServiceStatus::Failed {
                error: error.to_string(),
            };
            return Err(error);
        }

        // Expose providers in configuration order.
        successes.sort_by_key(|(index, _)| *index);
        self.connected = successes.into_iter().map(|(_, p)| p).collect();

        let summary = ConnectSummary {
            connected: self.connected.iter().map(|p| p.name.clone()).collect(),
            endpoints: self.connected.iter().map(|p| p.endpoint.clone()).collect(),
        };
        self.status = ProviderServiceStatus::Connected {
            connected: self.connected.len(),
            endpoints: summary.endpoints.clone(),
        };
        Ok(summary)
    }

    /// Disconnects all connected providers. Individual failures are
    /// collected, not short-circuited; the service always reaches
    /// `Disconnected` even when some disconnects failed.
    pub async fn disconnect(&mut self) -> Result<(), ProviderError> {
        let mut failed: Vec<String> = Vec::new();
        for provider in &mut self.connected {
            if let Err(e) = provider.disconnect().await {
                tracing::warn!(
                    target: "providers",
                    "disconnect of '{}' failed: {e}",
                    provider.name
                );
                failed.push(provider.name.clone());
            }
        }
        self.connected.clear();
        self.status = ProviderServiceStatus::Disconnected;

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Disconnect {
                names: failed.join(", "),
            })
        }
    }

    /// Probes every connected provider. Fails immediately, without I/O, when
    /// the service is not `Connected`. Never mutates state.
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        self.require_connected()?;
        for provider in &self.connected {
            Self::probe(provider).await?;
        }
        Ok(())
    }

    /// Probes one provider by name.
    pub async fn health_check_provider(&self, name: &str) -> Result<(), ProviderError> {
        self.require_connected()?;
        let provider = self.connected.iter().find(|p| p.name == name).ok_or_else(|| {
            ProviderError::NotConnected {
                status: format!("no provider named '{name}'"),
            }
        })?;
        Self::probe(provider).await
    }

    /// A pure read; returns `None` when not connected.
    pub fn provider(&self, name: &str) -> Option<&ConnectedProvider> {
        self.connected.iter().find(|p| p.name == name)
    }

    /// A pure read; empty when not connected.
    pub fn all_providers(&self) -> &[ConnectedProvider] {
        &self.connected
    }

    /// The current service status.
    pub fn status(&self) -> &ProviderServiceStatus {
        &self.status
    }

    fn require_connected(&self) -> Result<(), ProviderError> {
        if self.status.is_connected() {
            Ok(())
        } else {
            Err(ProviderError::NotConnected {
                status: self.status.label().to_string(),
            })
        }
    }

    async fn probe(provider: &ConnectedProvider) -> Result<(), ProviderError> {
        let Some(client) = provider.client() else {
            return Err(ProviderError::HealthCheck {
                name: provider.name.clone(),
                kind: provider.kind,
                endpoint: provider.endpoint.clone(),
                reason: "client already disconnected".into(),
            });
        };
        client
            .health_check()
            .await
            .map_err(|reason| ProviderError::HealthCheck {
                name: provider.name.clone(),
                kind: provider.kind,
                endpoint: provider.endpoint.clone(),
                reason,
            })
    }
}

/// Per-provider connection: up to `retry.attempts` attempts, each racing the
/// connector against `retry.attempt_timeout_ms`; a timeout or connect error
/// counts as a failed attempt and is retried after a fixed backoff until the
/// ceiling is reached.
async fn connect_with_retry(
    factory: Arc<dyn ConnectorFactory>,
    lazy: LazyProvider,
    retry: RetryPolicy,
) -> Result<ConnectedProvider, ProviderError> {
    let exhausted = |endpoint: &str, attempts: u32| ProviderError::Connection {
        name: lazy.name.clone(),
        kind: lazy.kind,
        endpoint: endpoint.to_string(),
        attempts,
    };

    let Some(raw_endpoint) = lazy.endpoints.first() else {
        return Err(exhausted("<no endpoint configured>", 0));
    };
    let endpoint = match resolve_endpoint(raw_endpoint) {
        Ok(endpoint) => endpoint,
        Err(reason) => {
            tracing::warn!(target: "providers", "endpoint resolution failed: {reason}");
            return Err(exhausted(raw_endpoint, 0));
        }
    };

    let connector = factory.connector(lazy.kind);
    let attempt_timeout = Duration::from_millis(retry.attempt_timeout_ms);
    let backoff = Duration::from_millis(retry.backoff_ms);

    for attempt in 1..=retry.attempts {
        match timeout(attempt_timeout, connector.connect(&endpoint)).await {
            Ok(Ok(client)) => {
                return Ok(ConnectedProvider {
                    name: lazy.name,
                    kind: lazy.kind,
                    endpoint,
                    client: Some(client),
                });
            }
            Ok(Err(reason)) => {
                tracing::debug!(
                    target: "providers",
                    "'{}' attempt {attempt}/{} failed: {reason}",
                    lazy.name,
                    retry.attempts
                );
            }
            Err(_) => {
                tracing::debug!(
                    target: "providers",
                    "'{}' attempt {attempt}/{} timed out after {attempt_timeout:?}",
                    lazy.name,
                    retry.attempts
                );
            }
        }
        if attempt < retry.attempts {
            sleep(backoff).await;
        }
    }

    Err(exhausted(&endpoint, retry.attempts))
}
