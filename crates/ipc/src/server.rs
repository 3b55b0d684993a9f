// Path: crates/ipc/src/server.rs

//! The control-channel server: one per running multi-node network.

use crate::protocol::{ControlCommand, ControlRequest, ControlResponse};
use crate::table::{pid_alive, signal_pid, SharedProcessTable};
use nix::sys::signal::Signal;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Settle delay after respawning a node on `restart`.
const RESTART_SETTLE: Duration = Duration::from_secs(1);

/// How long `resume` polls for the node to report alive again.
const RESUME_SETTLE: Duration = Duration::from_secs(5);
const RESUME_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A control-channel server bound to a Unix domain socket inside the
/// network's temporary directory. Accepts connections for the lifetime of the
/// running network; each connection carries exactly one request/response pair.
#[derive(Debug)]
pub struct ControlServer {
    socket_path: PathBuf,
    accept_task: JoinHandle<()>,
}

impl ControlServer {
    /// Binds the socket (owner-only permissions) and starts the accept loop.
    pub fn bind(socket_path: &Path, table: SharedProcessTable) -> io::Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)?;
        }
        let listener = UnixListener::bind(socket_path)?;
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }
        tracing::info!(target: "ipc", "control channel listening on {}", socket_path.display());

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let table = table.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, table).await {
                                tracing::warn!(target: "ipc", "control connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(target: "ipc", "control accept error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            accept_task,
        })
    }

    /// The socket path clients connect to.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Stops accepting connections and removes the socket file.
    pub fn shutdown(&self) {
        self.accept_task.abort();
        let _ = std::fs::remove_file(&self.socket_path);
        tracing::info!(target: "ipc", "control channel closed ({})", self.socket_path.display());
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        self.accept_task.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Reads one request (to EOF on the client's write side), dispatches it, and
/// writes exactly one response. Malformed or unknown input yields a `failure`
/// response, never a protocol-level error.
async fn handle_connection(mut stream: UnixStream, table: SharedProcessTable) -> io::Result<()> {
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    let response = match serde_json::from_slice::<ControlRequest>(&raw) {
        Ok(request) => {
            tracing::debug!(target: "ipc", "control request: {}", request.text);
            dispatch(request, &table).await
        }
        Err(e) => ControlResponse::failure(format!("invalid request: {e}")),
    };

    let body = serde_json::to_vec(&response).map_err(io::Error::other)?;
    stream.write_all(&body).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn dispatch(request: ControlRequest, table: &SharedProcessTable) -> ControlResponse {
    match request.cmd {
        ControlCommand::Networkmap => {
            let map = table.lock().await.network_map();
            ControlResponse::success(map, "network map")
        }
        cmd => {
            let Some(name) = request.node_name.as_deref() else {
                return ControlResponse::failure(format!("command '{cmd}' requires a nodeName"));
            };
            match cmd {
                ControlCommand::Isup => is_up(name, table).await,
                ControlCommand::Kill => kill_node(name, table).await,
                ControlCommand::Pause => pause_node(name, table).await,
                ControlCommand::Resume => resume_node(name, table).await,
                ControlCommand::Restart => restart_node(name, table).await,
                ControlCommand::Networkmap => unreachable!("handled above"),
            }
        }
    }
}

async fn is_up(name: &str, table: &SharedProcessTable) -> ControlResponse {
    let guard = table.lock().await;
    if !guard.contains(name) {
        return ControlResponse::failure(format!("unknown node '{name}'"));
    }
    let alive = guard.pid_of(name).map(pid_alive).unwrap_or(false);
    ControlResponse::success(
        serde_json::Value::Bool(alive),
        format!("node '{name}' is {}", if alive { "up" } else { "down" }),
    )
}

async fn kill_node(name: &str, table: &SharedProcessTable) -> ControlResponse {
    match table.lock().await.kill_node(name).await {
        Some(Ok(())) => {
            ControlResponse::success(serde_json::Value::Bool(true), format!("node '{name}' killed"))
        }
        Some(Err(e)) => ControlResponse::failure(e),
        None => ControlResponse::failure(format!("unknown node '{name}'")),
    }
}

/// Resolves a node to its live pid, distinguishing unregistered nodes from
/// registered-but-dead ones.
async fn live_pid(name: &str, table: &SharedProcessTable) -> Result<u32, ControlResponse> {
    let guard = table.lock().await;
    if !guard.contains(name) {
        return Err(ControlResponse::failure(format!("unknown node '{name}'")));
    }
    guard
        .pid_of(name)
        .ok_or_else(|| ControlResponse::failure(format!("node '{name}' has no live process")))
}

async fn pause_node(name: &str, table: &SharedProcessTable) -> ControlResponse {
    let pid = match live_pid(name, table).await {
        Ok(pid) => pid,
        Err(failure) => return failure,
    };
    match signal_pid(pid, Signal::SIGSTOP) {
        Ok(()) => {
            ControlResponse::success(serde_json::Value::Bool(true), format!("node '{name}' paused"))
        }
        Err(e) => ControlResponse::failure(e),
    }
}

async fn resume_node(name: &str, table: &SharedProcessTable) -> ControlResponse {
    let pid = match live_pid(name, table).await {
        Ok(pid) => pid,
        Err(failure) => return failure,
    };
    if let Err(e) = signal_pid(pid, Signal::SIGCONT) {
        return ControlResponse::failure(e);
    }
    // Wait for the node to report alive again before replying.
    let deadline = tokio::time::Instant::now() + RESUME_SETTLE;
    while tokio::time::Instant::now() < deadline {
        if pid_alive(pid) {
            return ControlResponse::success(
                serde_json::Value::Bool(true),
                format!("node '{name}' resumed"),
            );
        }
        sleep(RESUME_POLL_INTERVAL).await;
    }
    ControlResponse::failure(format!("node '{name}' did not report ready after resume"))
}

/// Restart does not require prior liveness: a node whose process already died
/// is simply respawned from its relaunch spec.
async fn restart_node(name: &str, table: &SharedProcessTable) -> ControlResponse {
    let mut guard = table.lock().await;
    let Some(entry) = guard.entry_mut(name) else {
        return ControlResponse::failure(format!("unknown node '{name}'"));
    };

    if let Some(mut child) = entry.child.take() {
        if child.start_kill().is_ok() {
            let _ = child.wait().await;
        }
    }
    if let Some(old_pid) = entry.pid.take() {
        if pid_alive(old_pid) {
            if let Err(e) = signal_pid(old_pid, Signal::SIGKILL) {
                return ControlResponse::failure(e);
            }
        }
    }

    let child = match entry.relaunch.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ControlResponse::failure(format!(
                "failed to respawn '{}' from {}: {e}",
                name,
                entry.relaunch.program.display()
            ))
        }
    };
    let Some(pid) = child.id() else {
        return ControlResponse::failure(format!("respawned '{name}' exited immediately"));
    };
    entry.pid = Some(pid);
    entry.child = Some(child);
    drop(guard);

    sleep(RESTART_SETTLE).await;
    ControlResponse::success(
        serde_json::Value::Bool(true),
        format!("node '{name}' restarted"),
    )
}
