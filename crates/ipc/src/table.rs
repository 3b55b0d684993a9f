// Path: crates/ipc/src/table.rs

//! The shared node process table.
//!
//! One table exists per running multi-node network. Nodes stay registered for
//! the network's lifetime; what `kill` removes is the node's *live process*
//! (its tracked pid), so a later `restart` can still respawn it from the
//! stored relaunch spec. The table is the single source of truth for "is this
//! pid still tracked": both the IPC `kill` command and the foundation's stop
//! path mutate it, so they can never disagree about which processes remain
//! alive.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Everything needed to respawn a node's process.
#[derive(Debug, Clone)]
pub struct RelaunchSpec {
    /// The program to execute.
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Extra environment variables.
    pub envs: Vec<(String, String)>,
}

impl RelaunchSpec {
    /// Spawns a fresh process from this spec. Output is discarded; the node's
    /// original log streams belong to the launch that first supervised it.
    pub fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

/// One registered node and, when alive, its tracked process.
#[derive(Debug)]
pub struct NodeEntry {
    /// The OS process id currently backing the node; `None` after `kill`.
    pub pid: Option<u32>,
    /// How to respawn the node on `restart`.
    pub relaunch: RelaunchSpec,
    /// The owned child handle, when this process was spawned in-process.
    pub child: Option<Child>,
}

/// Node name → registered node.
#[derive(Debug, Default)]
pub struct ProcessTable {
    entries: HashMap<String, NodeEntry>,
}

/// The process table as shared between the control server and the stop path.
pub type SharedProcessTable = Arc<Mutex<ProcessTable>>;

/// Signal-0 liveness probe for a pid.
pub fn pid_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Sends `sig` to `pid`, ignoring ESRCH (already gone).
pub fn signal_pid(pid: u32, sig: Signal) -> Result<(), String> {
    match kill(Pid::from_raw(pid as i32), Some(sig)) {
        Ok(()) => Ok(()),
        Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(format!("failed to send {sig} to pid {pid}: {e}")),
    }
}

impl ProcessTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh table for sharing.
    pub fn shared() -> SharedProcessTable {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Registers a node. Replacing an existing entry drops (and thereby
    /// kills) the previous child handle.
    pub fn insert(&mut self, name: impl Into<String>, entry: NodeEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// The tracked pid for a node, if it is registered and alive-tracked.
    pub fn pid_of(&self, name: &str) -> Option<u32> {
        self.entries.get(name).and_then(|e| e.pid)
    }

    /// Mutable access to a registered entry.
    pub fn entry_mut(&mut self, name: &str) -> Option<&mut NodeEntry> {
        self.entries.get_mut(name)
    }

    /// Whether a node is registered (alive or not).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered node names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The node name → tracked pid map served by `networkmap`. Killed nodes
    /// appear with a `null` pid.
    pub fn network_map(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, entry) in &self.entries {
            let pid = match entry.pid {
                Some(pid) => serde_json::Value::from(pid),
                None => serde_json::Value::Null,
            };
            map.insert(name.clone(), pid);
        }
        serde_json::Value::Object(map)
    }

    /// Terminates one node's live process and stops tracking its pid. The
    /// node stays registered so it can be restarted later.
    pub async fn kill_node(&mut self, name: &str) -> Option<Result<(), String>> {
        let entry = self.entries.get_mut(name)?;
        let mut outcome = Ok(());
        if let Some(mut child) = entry.child.take() {
            if child.start_kill().is_ok() {
                let _ = child.wait().await;
            }
        }
        if let Some(pid) = entry.pid.take() {
            outcome = signal_pid(pid, Signal::SIGKILL);
        }
        Some(outcome)
    }

    /// Force-kills every tracked process and clears the table. Collects
    /// failures instead of short-circuiting; returns the offenders.
    pub async fn kill_all(&mut self) -> Vec<String> {
        let mut failures = Vec::new();
        for (name, mut entry) in self.entries.drain() {
            if let Some(child) = entry.child.as_mut() {
                if child.start_kill().is_ok() {
                    let _ = child.wait().await;
                    continue;
                }
            }
            // Safety net for pids whose child handle was lost or external.
            if let Some(pid) = entry.pid {
                if let Err(e) = signal_pid(pid, Signal::SIGKILL) {
                    tracing::warn!(target: "ipc", "failed to kill node '{}': {}", name, e);
                    failures.push(name);
                }
            }
        }
        failures
    }
}
