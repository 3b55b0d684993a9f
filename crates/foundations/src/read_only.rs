// Path: crates/foundations/src/read_only.rs

//! The ReadOnly foundation: an existing network reached over its endpoints.
//!
//! No process is spawned; `start` records the configured connection
//! descriptors and `stop` is a no-op. Liveness of the remote network is the
//! providers' concern, so `health_check` here only verifies lifecycle state —
//! the orchestration context degrades the probe to a provider-level check.

use crate::foundation::{
    begin_start, new_run_cell, new_status, read_status, require_running, set_status, teardown,
    ActiveRun, Foundation, RunCell, SharedStatus, StartOutcome, StopHandle,
};
use async_trait::async_trait;
use plinth_types::{FoundationError, FoundationStatus, ReadOnlyConfig, RunningInfo};

/// A read-only foundation over an existing network.
pub struct ReadOnlyFoundation {
    config: ReadOnlyConfig,
    status: SharedStatus,
    run: RunCell,
}

impl ReadOnlyFoundation {
    /// A stopped service for `config`.
    pub fn new(config: ReadOnlyConfig) -> Self {
        Self {
            config,
            status: new_status(),
            run: new_run_cell(),
        }
    }

    /// The connection descriptors recorded at configuration time.
    pub fn connections(&self) -> &[plinth_types::ProviderConfig] {
        &self.config.connections
    }
}

#[async_trait]
impl Foundation for ReadOnlyFoundation {
    async fn start(&mut self) -> Result<StartOutcome, FoundationError> {
        begin_start(&self.status)?;

        let endpoints: Vec<String> = self
            .config
            .connections
            .iter()
            .filter_map(|c| c.endpoints.first().cloned())
            .collect();

        let info = RunningInfo {
            endpoints: endpoints.clone(),
            base_dir: None,
            nodes: Vec::new(),
            control_socket: None,
        };

        *self.run.lock().await = Some(ActiveRun::default());
        set_status(
            &self.status,
            FoundationStatus::Running {
                endpoints,
                node_count: 0,
            },
        );

        Ok(StartOutcome {
            info,
            stop: StopHandle {
                cell: self.run.clone(),
                status: self.status.clone(),
            },
        })
    }

    async fn stop(&mut self) -> Result<(), FoundationError> {
        teardown(&self.run, &self.status).await
    }

    fn status(&self) -> FoundationStatus {
        read_status(&self.status)
    }

    async fn health_check(&self) -> Result<(), FoundationError> {
        require_running(&self.status)
    }
}
