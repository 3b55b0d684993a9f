// Path: crates/foundations/src/network.rs

//! Multi-node network bring-up for the Zombie foundation.
//!
//! Nodes are launched in specification order: relay chain first, then each
//! parachain's collators. Every successfully launched node's child handle is
//! moved into the shared process table immediately, so a failure mid-launch
//! rolls back by force-killing the table.

use crate::process::{LaunchCmd, ProcessSupervisor, RunningProcess};
use plinth_ipc::table::{NodeEntry, ProcessTable, RelaunchSpec, SharedProcessTable};
use plinth_types::{
    FoundationError, NodeInfo, NodeRole, ZombieNetworkSpec, ZombieNodeSpec,
};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fully launched multi-node network, ready for its control channel.
pub(crate) struct LaunchedNetwork {
    /// The network's temporary working directory.
    pub base_dir: TempDir,
    /// The shared process table tracking every node.
    pub table: SharedProcessTable,
    /// Node descriptions in launch order.
    pub nodes: Vec<NodeInfo>,
}

/// One resolved node launch, produced during validation.
struct ResolvedNode {
    name: String,
    role: NodeRole,
    program: PathBuf,
    args: Vec<String>,
    ws_port: u16,
    ready_pattern: Option<String>,
    parachain_id: Option<u32>,
}

/// Validates the launch specification and brings the network up.
///
/// Validation happens entirely before the first spawn: node names must be
/// unique within the network, and every referenced binary must exist — a
/// missing binary fails fast with an error naming it.
pub(crate) async fn launch_network(
    spec: &ZombieNetworkSpec,
) -> Result<LaunchedNetwork, FoundationError> {
    let resolved = resolve_nodes(spec)?;

    let base_dir = tempfile::Builder::new()
        .prefix("plinth-zombie-")
        .tempdir()
        .map_err(|e| FoundationError::Startup {
            reason: format!("failed to create network working directory: {e}"),
        })?;

    let table = ProcessTable::shared();
    let mut nodes = Vec::with_capacity(resolved.len());

    for node in resolved {
        match launch_node(&node).await {
            Ok(process) => {
                let (pid, child) = process.into_child();
                table.lock().await.insert(
                    node.name.clone(),
                    NodeEntry {
                        pid: Some(pid),
                        relaunch: RelaunchSpec {
                            program: node.program.clone(),
                            args: node.args.clone(),
                            envs: Vec::new(),
                        },
                        child: Some(child),
                    },
                );
                nodes.push(NodeInfo {
                    name: node.name,
                    role: node.role,
                    ws_endpoint: format!("ws://127.0.0.1:{}", node.ws_port),
                    multi_address: None,
                    parachain_id: node.parachain_id,
                });
            }
            Err(e) => {
                // Roll back everything launched so far before surfacing.
                tracing::warn!(
                    target: "foundations",
                    "node '{}' failed to launch; rolling back {} started node(s)",
                    node.name,
                    nodes.len()
                );
                table.lock().await.kill_all().await;
                return Err(e);
            }
        }
    }

    Ok(LaunchedNetwork {
        base_dir,
        table,
        nodes,
    })
}

fn resolve_nodes(spec: &ZombieNetworkSpec) -> Result<Vec<ResolvedNode>, FoundationError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut resolved = Vec::new();

    for node in &spec.relaychain.nodes {
        check_unique(&mut seen, &node.name)?;
        let program = node
            .command
            .clone()
            .unwrap_or_else(|| spec.relaychain.default_command.clone());
        check_binary(&node.name, &program)?;
        let ws_port = pick_port(node)?;
        let mut args = spec.relaychain.default_args.clone();
        args.extend(node.args.iter().cloned());
        args.push(format!("--chain={}", spec.relaychain.chain));
        args.push(format!("--name={}", node.name));
        args.push(format!("--ws-port={ws_port}"));
        resolved.push(ResolvedNode {
            name: node.name.clone(),
            role: NodeRole::Relaychain,
            program,
            args,
            ws_port,
            ready_pattern: node.ready_pattern.clone(),
            parachain_id: None,
        });
    }

    for parachain in &spec.parachains {
        for collator in &parachain.collators {
            check_unique(&mut seen, &collator.name)?;
            let program = collator
                .command
                .clone()
                .unwrap_or_else(|| spec.relaychain.default_command.clone());
            check_binary(&collator.name, &program)?;
            let ws_port = pick_port(collator)?;
            let mut args = collator.args.clone();
            args.push(format!("--parachain-id={}", parachain.id));
            args.push(format!("--name={}", collator.name));
            args.push(format!("--ws-port={ws_port}"));
            resolved.push(ResolvedNode {
                name: collator.name.clone(),
                role: NodeRole::Parachain,
                program,
                args,
                ws_port,
                ready_pattern: collator.ready_pattern.clone(),
                parachain_id: Some(parachain.id),
            });
        }
    }

    Ok(resolved)
}

fn check_unique<'a>(seen: &mut HashSet<&'a str>, name: &'a str) -> Result<(), FoundationError> {
    if seen.insert(name) {
        Ok(())
    } else {
        Err(FoundationError::Startup {
            reason: format!("duplicate node name '{name}' in launch specification"),
        })
    }
}

fn check_binary(name: &str, program: &Path) -> Result<(), FoundationError> {
    if program.exists() {
        Ok(())
    } else {
        Err(FoundationError::Startup {
            reason: format!("missing binary for node '{name}': {}", program.display()),
        })
    }
}

fn pick_port(node: &ZombieNodeSpec) -> Result<u16, FoundationError> {
    match node.ws_port {
        Some(port) => Ok(port),
        None => portpicker::pick_unused_port().ok_or_else(|| FoundationError::Startup {
            reason: format!("no free websocket port available for node '{}'", node.name),
        }),
    }
}

async fn launch_node(node: &ResolvedNode) -> Result<RunningProcess, FoundationError> {
    let mut cmd = LaunchCmd::new(&node.name, &node.program);
    cmd.args = node.args.clone();
    if let Some(pattern) = &node.ready_pattern {
        cmd.ready_pattern = Regex::new(pattern).map_err(|e| FoundationError::Startup {
            reason: format!("invalid readiness pattern '{pattern}' for node '{}': {e}", node.name),
        })?;
    }
    ProcessSupervisor::spawn(cmd).await
}
