// Path: crates/foundations/src/dev.rs

//! The Dev foundation: one locally spawned development node.

use crate::foundation::{
    begin_start, new_run_cell, new_status, read_status, require_running, set_status, teardown,
    ActiveRun, Foundation, RunCell, SharedStatus, StartOutcome, StopHandle,
};
use crate::process::{LaunchCmd, ProcessSupervisor, DEFAULT_READY_TIMEOUT};
use async_trait::async_trait;
use plinth_types::{DevConfig, FoundationError, FoundationStatus, NodeInfo, NodeRole, RunningInfo};
use regex::Regex;
use std::time::Duration;

/// The websocket port assumed when no port flag is present in the argument
/// list.
pub const DEFAULT_WS_PORT: u16 = 9944;

/// The default launch argument set: telemetry, benchmarks, and consensus
/// extras disabled; manual sealing and authoring forced; temp storage.
/// Overridden wholesale by an explicit `options` list.
pub const DEFAULT_DEV_ARGS: &[&str] = &[
    "--no-hardware-benchmarks",
    "--no-telemetry",
    "--no-prometheus",
    "--no-grandpa",
    "--reserved-only",
    "--rpc-cors=all",
    "--unsafe-rpc-external",
    "--rpc-methods=unsafe",
    "--sealing=manual",
    "--force-authoring",
    "--alice",
    "--tmp",
];

/// A single-node development foundation.
pub struct DevFoundation {
    config: DevConfig,
    status: SharedStatus,
    run: RunCell,
}

impl DevFoundation {
    /// A stopped service for `config`.
    pub fn new(config: DevConfig) -> Self {
        Self {
            config,
            status: new_status(),
            run: new_run_cell(),
        }
    }

    /// Resolves the effective argument list: explicit `options` wholesale, or
    /// the default set, plus port flags for explicitly configured ports only.
    fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = match &self.config.options {
            Some(options) => options.clone(),
            None => DEFAULT_DEV_ARGS.iter().map(|s| s.to_string()).collect(),
        };
        if let Some(port) = self.config.ports.p2p_port {
            args.push(format!("--port={port}"));
        }
        if let Some(port) = self.config.ports.ws_port {
            args.push(format!("--ws-port={port}"));
        }
        if let Some(port) = self.config.ports.rpc_port {
            args.push(format!("--rpc-port={port}"));
        }
        args
    }

    /// The effective websocket port, extracted from the final argument list.
    fn ws_port_from_args(args: &[String]) -> u16 {
        for prefix in ["--ws-port=", "--rpc-port="] {
            if let Some(port) = args
                .iter()
                .find_map(|a| a.strip_prefix(prefix))
                .and_then(|v| v.parse().ok())
            {
                return port;
            }
        }
        DEFAULT_WS_PORT
    }

    fn launch_cmd(&self, args: Vec<String>) -> Result<LaunchCmd, FoundationError> {
        let mut cmd = LaunchCmd::new(&self.config.name, &self.config.bin_path);
        cmd.args = args;
        if let Some(pattern) = &self.config.ready_pattern {
            cmd.ready_pattern = Regex::new(pattern).map_err(|e| FoundationError::Startup {
                reason: format!("invalid readiness pattern '{pattern}': {e}"),
            })?;
        }
        cmd.ready_timeout = self
            .config
            .ready_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_READY_TIMEOUT);
        Ok(cmd)
    }
}

#[async_trait]
impl Foundation for DevFoundation {
    async fn start(&mut self) -> Result<StartOutcome, FoundationError> {
        begin_start(&self.status)?;

        let args = self.build_args();
        let ws_port = Self::ws_port_from_args(&args);

        let outcome = async {
            let cmd = self.launch_cmd(args)?;
            ProcessSupervisor::spawn(cmd).await
        }
        .await;

        let process = match outcome {
            Ok(process) => process,
            Err(e) => {
                // The supervisor tears down anything it spawned before
                // failing, so nothing is left to roll back here.
                set_status(
                    &self.status,
                    FoundationStatus::Failed {
                        error: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        let ws_endpoint = format!("ws://127.0.0.1:{ws_port}");
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
                reason: format!("node '{}' process is not alive", self.config.name),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_types::PortsConfig;

    fn config(ports: PortsConfig, options: Option<Vec<String>>) -> DevConfig {
        DevConfig {
            bin_path: "/bins/node-template".into(),
            name: "dev".into(),
            ports,
            options,
            ready_pattern: None,
            ready_timeout_secs: None,
        }
    }

    #[test]
    fn default_args_omit_unconfigured_ports() {
        let f = DevFoundation::new(config(PortsConfig::default(), None));
        let args = f.build_args();
        assert!(args.iter().any(|a| a == "--sealing=manual"));
        assert!(!args.iter().any(|a| a.starts_with("--port=")));
        assert!(!args.iter().any(|a| a.starts_with("--ws-port=")));
        assert_eq!(DevFoundation::ws_port_from_args(&args), DEFAULT_WS_PORT);
    }

    #[test]
    fn explicit_ports_are_appended_and_extracted() {
        let ports = PortsConfig {
            p2p_port: Some(30333),
            ws_port: Some(9955),
            rpc_port: None,
        };
        let f = DevFoundation::new(config(ports, None));
        let args = f.build_args();
        assert!(args.iter().any(|a| a == "--port=30333"));
        assert!(args.iter().any(|a| a == "--ws-port=9955"));
        assert_eq!(DevFoundation::ws_port_from_args(&args), 9955);
    }

    #[test]
    fn explicit_options_replace_defaults_wholesale() {
        let options = vec!["--dev".to_string(), "--rpc-port=9933".to_string()];
        let f = DevFoundation::new(config(PortsConfig::default(), Some(options)));
        let args = f.build_args();
        assert_eq!(args, vec!["--dev", "--rpc-port=9933"]);
        assert_eq!(DevFoundation::ws_port_from_args(&args), 9933);
    }
}
