// Path: crates/foundations/src/chopsticks.rs

//! The Chopsticks foundation: a forked/replay node launched from a YAML
//! configuration.
//!
//! Block-control operations against a running chopsticks instance
//! (`dev_newBlock`, `dev_setStorage`, `dev_setHead`, `chain_getBlock`) are
//! JSON-RPC calls over the connected provider's websocket, not control-channel
//! commands; they live with the orchestration context, next to the provider
//! that carries them.

use crate::foundation::{
    begin_start, new_run_cell, new_status, read_status, require_running, set_status, teardown,
    ActiveRun, Foundation, RunCell, SharedStatus, StartOutcome, StopHandle,
};
use crate::process::{LaunchCmd, ProcessSupervisor, RunningProcess, DEFAULT_READY_TIMEOUT};
use async_trait::async_trait;
use plinth_types::{
    ChopsticksConfig, FoundationError, FoundationStatus, NodeInfo, NodeRole, RunningInfo,
};
use regex::Regex;
use std::time::Duration;

/// Port assumed when the YAML configuration does not set one.
pub const DEFAULT_CHOPSTICKS_PORT: u16 = 8000;

/// Default readiness pattern for a chopsticks process.
pub const DEFAULT_CHOPSTICKS_READY_PATTERN: &str = "listening on";

/// A forked/replay-node foundation.
pub struct ChopsticksFoundation {
    config: ChopsticksConfig,
    status: SharedStatus,
    run: RunCell,
}

impl ChopsticksFoundation {
    /// A stopped service for `config`.
    pub fn new(config: ChopsticksConfig) -> Self {
        Self {
            config,
            status: new_status(),
            run: new_run_cell(),
        }
    }

    /// Validates the referenced YAML configuration and returns the effective
    /// port (default 8000 when absent).
    fn effective_port(&self) -> Result<u16, FoundationError> {
        let path = &self.config.config_path;
        let raw = std::fs::read_to_string(path).map_err(|e| FoundationError::Startup {
            reason: format!("chopsticks config {}: {e}", path.display()),
        })?;
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).map_err(|e| FoundationError::Startup {
                reason: format!("chopsticks config {} is not valid YAML: {e}", path.display()),
            })?;
        let port = yaml
            .get("port")
            .and_then(serde_yaml::Value::as_u64)
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(DEFAULT_CHOPSTICKS_PORT);
        Ok(port)
    }

    fn launch_cmd(&self) -> Result<LaunchCmd, FoundationError> {
        let spec = &self.config.launch_spec;
        let mut cmd = LaunchCmd::new(&self.config.name, &spec.command);
        cmd.args = spec.args.clone();
        let pattern = spec
            .ready_pattern
            .as_deref()
            .unwrap_or(DEFAULT_CHOPSTICKS_READY_PATTERN);
        cmd.ready_pattern = Regex::new(pattern).map_err(|e| FoundationError::Startup {
            reason: format!("invalid readiness pattern '{pattern}': {e}"),
        })?;
        cmd.ready_timeout = spec
            .ready_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_READY_TIMEOUT);
        Ok(cmd)
    }
}

#[async_trait]
impl Foundation for ChopsticksFoundation {
    async fn start(&mut self) -> Result<StartOutcome, FoundationError> {
        begin_start(&self.status)?;

        let outcome: Result<(u16, RunningProcess), FoundationError> = async {
            let port = self.effective_port()?;
            let cmd = self.launch_cmd()?;
            let process = ProcessSupervisor::spawn(cmd).await?;
            Ok((port, process))
        }
        .await;

        let (port, process) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                set_status(
                    &self.status,
                    FoundationStatus::Failed {
                        error: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        let ws_endpoint = format!("ws://127.0.0.1:{port}");
        let info = RunningInfo {
            endpoints: vec![ws_endpoint.clone()],
            base_dir: None,
            nodes: vec![NodeInfo {
                name: self.config.name.clone(),
                role: NodeRole::Binary,
                ws_endpoint,
                multi_address: None,
                parachain_id: None,
            }],
            control_socket: None,
        };

        *self.run.lock().await = Some(ActiveRun {
            processes: vec![process],
            ..ActiveRun::default()
        });
        set_status(
            &self.status,
            FoundationStatus::Running {
                endpoints: info.endpoints.clone(),
                node_count: 1,
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
        require_running(&self.status)?;
        let guard = self.run.lock().await;
        let alive = guard
            .as_ref()
            .and_then(|run| run.processes.first())
            .map(|p| p.is_alive())
            .unwrap_or(false);
        if alive {
            Ok(())
        } else {
            Err(FoundationError::HealthCheck {
                reason: format!("chopsticks process '{}' is not alive", self.config.name),
            })
        }
    }
}
