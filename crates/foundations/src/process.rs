// Path: crates/foundations/src/process.rs

//! Single-process supervision: spawn, stream output, detect readiness.

use plinth_types::FoundationError;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::process::{Child, Command};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

/// Default deadline for the readiness pattern to appear in process output.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(15);

/// Default readiness pattern for substrate-style node binaries.
pub const DEFAULT_NODE_READY_PATTERN: &str = "Running JSON-RPC server";

/// Bounded capacity of the per-process log fan-out channel.
pub const LOG_CHANNEL_CAPACITY: usize = 8192;

/// How often the readiness wait re-checks the deadline and child liveness
/// while no new output arrives.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Everything needed to spawn and recognize one process.
#[derive(Debug, Clone)]
pub struct LaunchCmd {
    /// Name used in logs and errors.
    pub name: String,
    /// The program to execute.
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Extra environment variables.
    pub envs: Vec<(String, String)>,
    /// Readiness pattern tested against each output line.
    pub ready_pattern: Regex,
    /// Deadline for the readiness pattern.
    pub ready_timeout: Duration,
}

impl LaunchCmd {
    /// A launch command with the default readiness pattern and deadline.
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            ready_pattern: default_ready_pattern(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

/// The default pattern is a valid literal; compiling it cannot fail.
#[allow(clippy::unwrap_used)]
fn default_ready_pattern() -> Regex {
    Regex::new(DEFAULT_NODE_READY_PATTERN).unwrap()
}

/// A supervised, running process. The child is `kill_on_drop`, so dropping
/// the handle (or the parent exiting) tears the process down.
#[derive(Debug)]
pub struct RunningProcess {
    name: String,
    pid: u32,
    child: Child,
    log_tx: broadcast::Sender<String>,
    drains: Vec<JoinHandle<()>>,
}

impl RunningProcess {
    /// The supervised process's OS pid.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The node name this process backs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes to the process's combined stdout/stderr line stream.
    pub fn subscribe_logs(&self) -> broadcast::Receiver<String> {
        self.log_tx.subscribe()
    }

    /// Whether the process is still running (signal-0 probe).
    pub fn is_alive(&self) -> bool {
        plinth_ipc::table::pid_alive(self.pid)
    }

    /// Kills the process and waits for it to exit, so ports and pids are
    /// released before returning.
    pub async fn kill(&mut self) -> Result<(), FoundationError> {
        for drain in self.drains.drain(..) {
            drain.abort();
        }
        self.child
            .start_kill()
            .map_err(|e| FoundationError::Shutdown {
                reason: format!("failed to kill '{}' (pid {}): {e}", self.name, self.pid),
            })?;
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| FoundationError::Shutdown {
                reason: format!("failed to reap '{}' (pid {}): {e}", self.name, self.pid),
            })?;
        tracing::info!(target: "foundations", "process '{}' exited with {}", self.name, status);
        Ok(())
    }

    /// Releases ownership of the child handle, e.g. to move it into the
    /// shared process table. Drain tasks keep running until the process's
    /// output streams close.
    pub fn into_child(self) -> (u32, Child) {
        (self.pid, self.child)
    }
}

/// Spawns a single OS process, streams its output, and detects a readiness
/// signal or times out.
pub struct ProcessSupervisor;

impl ProcessSupervisor {
    /// Spawns `cmd` and waits for its readiness pattern.
    ///
    /// Fails when the executable cannot be started, when the process exits
    /// before becoming ready, or when the pattern is not observed within the
    /// deadline; the timeout error carries the accumulated log buffer. On
    /// every failure path the child (if any) is torn down before returning.
    pub async fn spawn(cmd: LaunchCmd) -> Result<RunningProcess, FoundationError> {
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .envs(cmd.envs.iter().cloned())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FoundationError::Startup {
                reason: format!(
                    "failed to spawn '{}' from {}: {e}",
                    cmd.name,
                    cmd.program.display()
                ),
            })?;

        let pid = child.id().ok_or_else(|| FoundationError::Startup {
            reason: format!("process '{}' exited before it could be supervised", cmd.name),
        })?;

        let (log_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);
        // Subscribe before the drains start so no early output is missed.
        let mut ready_rx = log_tx.subscribe();

        let mut drains = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            drains.push(spawn_drain(stdout, log_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(spawn_drain(stderr, log_tx.clone()));
        }

        tracing::info!(
            target: "foundations",
            "spawned '{}' (pid {}), waiting for readiness pattern '{}'",
            cmd.name,
            pid,
            cmd.ready_pattern.as_str()
        );

        let started = Instant::now();
        let mut received: Vec<String> = Vec::new();
        loop {
            if started.elapsed() > cmd.ready_timeout {
                let captured = received.join("\n");
                tracing::warn!(
                    target: "foundations",
                    "'{}' readiness timeout; captured output:\n{}",
                    cmd.name,
                    captured
                );
                for drain in drains {
                    drain.abort();
                }
                // Dropping `child` kills it (kill_on_drop).
                return Err(FoundationError::Startup {
                    reason: format!(
                        "node '{}' did not emit readiness pattern '{}' within {:?}\n--- captured logs ---\n{captured}\n--- end logs ---",
                        cmd.name,
                        cmd.ready_pattern.as_str(),
                        cmd.ready_timeout
                    ),
                });
            }

            match timeout(READY_POLL_INTERVAL, ready_rx.recv()).await {
                Ok(Ok(line)) => {
                    let matched = cmd.ready_pattern.is_match(&line);
                    received.push(line);
                    if matched {
                        break;
                    }
                }
                Ok(Err(broadcast::error::RecvError::Lagged(count))) => {
                    received.push(format!("[warn] readiness wait missed {count} lines"));
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    // Both drains ended: the process closed its output.
                    let captured = received.join("\n");
                    return Err(FoundationError::Startup {
                        reason: format!(
                            "node '{}' exited before becoming ready\n--- captured logs ---\n{captured}\n--- end logs ---",
                            cmd.name
                        ),
                    });
                }
                Err(_) => {
                    // No output this tick; fail fast if the process died.
                    if let Ok(Some(status)) = child.try_wait() {
                        let captured = received.join("\n");
                        return Err(FoundationError::Startup {
                            reason: format!(
                                "node '{}' exited with {status} before becoming ready\n--- captured logs ---\n{captured}\n--- end logs ---",
                                cmd.name
                            ),
                        });
                    }
                }
            }
        }

        tracing::info!(target: "foundations", "node '{}' is ready", cmd.name);
        Ok(RunningProcess {
            name: cmd.name,
            pid,
            child,
            log_tx,
            drains,
        })
    }
}

fn spawn_drain(
    stream: impl tokio::io::AsyncRead + Unpin + Send + 'static,
    log_tx: broadcast::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let _ = log_tx.send(line);
        }
    })
}
