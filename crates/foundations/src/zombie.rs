// Path: crates/foundations/src/zombie.rs

//! The Zombie foundation: a multi-node relay + parachain network with an IPC
//! control channel.

use crate::foundation::{
    begin_start, new_run_cell, new_status, read_status, require_running, set_status, teardown,
    ActiveRun, Foundation, RunCell, SharedStatus, StartOutcome, StopHandle,
};
use crate::network::launch_network;
use async_trait::async_trait;
use plinth_ipc::server::ControlServer;
use plinth_ipc::table::pid_alive;
use plinth_types::{
    FoundationError, FoundationStatus, RunningInfo, ZombieConfig, ZombieNetworkSpec,
};
use std::path::PathBuf;

/// Socket file name created inside the network's temp directory.
const CONTROL_SOCKET_NAME: &str = "plinth.sock";

/// A multi-node network foundation.
pub struct ZombieFoundation {
    config: ZombieConfig,
    status: SharedStatus,
    run: RunCell,
}

impl ZombieFoundation {
    /// A stopped service for `config`.
    pub fn new(config: ZombieConfig) -> Self {
        Self {
            config,
            status: new_status(),
            run: new_run_cell(),
        }
    }

    fn load_spec(&self) -> Result<ZombieNetworkSpec, FoundationError> {
        let path = &self.config.config_path;
        let raw = std::fs::read_to_string(path).map_err(|e| FoundationError::Startup {
            reason: format!("zombie launch specification {}: {e}", path.display()),
        })?;
        serde_json::from_str(&raw).map_err(|e| FoundationError::Startup {
            reason: format!(
                "zombie launch specification {} is malformed: {e}",
                path.display()
            ),
        })
    }

    /// The control socket path of the running network, if any.
    pub async fn control_socket(&self) -> Option<PathBuf> {
        let guard = self.run.lock().await;
        guard
            .as_ref()
            .and_then(|run| run.control.as_ref())
            .map(|c| c.socket_path().to_path_buf())
    }
}

#[async_trait]
impl Foundation for ZombieFoundation {
    async fn start(&mut self) -> Result<StartOutcome, FoundationError> {
        begin_start(&self.status)?;

        let outcome = async {
            let spec = self.load_spec()?;
            let network = launch_network(&spec).await?;

            // The control channel is rooted in the network's temp dir and
            // must exist before start returns.
            let socket_path = network.base_dir.path().join(CONTROL_SOCKET_NAME);
            let control = ControlServer::bind(&socket_path, network.table.clone()).map_err(|e| {
                FoundationError::Startup {
                    reason: format!(
                        "failed to bind control socket {}: {e}",
                        socket_path.display()
                    ),
                }
            });
            match control {
                Ok(control) => Ok((network, control, socket_path)),
                Err(e) => {
                    // The network is already up; tear it down before failing.
                    network.table.lock().await.kill_all().await;
                    Err(e)
                }
            }
        }
        .await;

        let (network, control, socket_path) = match outcome {
            Ok(parts) => parts,
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

        let endpoints: Vec<String> = network.nodes.iter().map(|n| n.ws_endpoint.clone()).collect();
        let info = RunningInfo {
            endpoints: endpoints.clone(),
            base_dir: Some(network.base_dir.path().to_path_buf()),
            nodes: network.nodes.clone(),
            control_socket: Some(socket_path),
        };

        let node_count = network.nodes.len();
        *self.run.lock().await = Some(ActiveRun {
            processes: Vec::new(),
            control: Some(control),
            table: Some(network.table),
            base_dir: Some(network.base_dir),
        });
        set_status(
            &self.status,
            FoundationStatus::Running {
                endpoints,
                node_count,
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

    /// Closes the control channel first, then stops the network, force-
    /// killing any pids still present in the process table as a safety net
    /// against orphaned processes.
    async fn stop(&mut self) -> Result<(), FoundationError> {
        teardown(&self.run, &self.status).await
    }

    fn status(&self) -> FoundationStatus {
        read_status(&self.status)
    }

    async fn health_check(&self) -> Result<(), FoundationError> {
        require_running(&self.status)?;
        let guard = self.run.lock().await;
        let Some(table) = guard.as_ref().and_then(|run| run.table.as_ref()) else {
            return Err(FoundationError::HealthCheck {
                reason: "no process table for running network".into(),
            });
        };
        let table = table.lock().await;
        for name in table.names() {
            let alive = table.pid_of(&name).map(pid_alive).unwrap_or(false);
            if !alive {
                return Err(FoundationError::HealthCheck {
                    reason: format!("node '{name}' process is not alive"),
                });
            }
        }
        Ok(())
    }
}
