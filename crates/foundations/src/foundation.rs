// Path: crates/foundations/src/foundation.rs

//! The uniform foundation contract and the shared lifecycle machinery.

use crate::process::RunningProcess;
use async_trait::async_trait;
use plinth_ipc::server::ControlServer;
use plinth_ipc::table::SharedProcessTable;
use plinth_types::{FoundationConfig, FoundationError, FoundationStatus, RunningInfo};
use std::sync::{Arc, Mutex as StdMutex};
use tempfile::TempDir;
use tokio::sync::Mutex;

/// The one mutable status cell per service instance. Shared with the
/// [`StopHandle`] so a handle-driven teardown is reflected in the service's
/// observable status.
pub(crate) type SharedStatus = Arc<StdMutex<FoundationStatus>>;

pub(crate) fn new_status() -> SharedStatus {
    Arc::new(StdMutex::new(FoundationStatus::Stopped))
}

pub(crate) fn read_status(status: &SharedStatus) -> FoundationStatus {
    match status.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn set_status(status: &SharedStatus, value: FoundationStatus) {
    match status.lock() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// Resources owned by one successful `start()` call.
#[derive(Debug, Default)]
pub(crate) struct ActiveRun {
    /// Directly supervised processes (Dev, Chopsticks).
    pub processes: Vec<RunningProcess>,
    /// The control channel (Zombie).
    pub control: Option<ControlServer>,
    /// The shared process table (Zombie).
    pub table: Option<SharedProcessTable>,
    /// The network's temporary working directory; removed on teardown.
    pub base_dir: Option<TempDir>,
}

/// The run cell: `None` when nothing is provisioned. Shared between the
/// service and its [`StopHandle`] so both teardown paths agree on what is
/// still alive.
pub(crate) type RunCell = Arc<Mutex<Option<ActiveRun>>>;

pub(crate) fn new_run_cell() -> RunCell {
    Arc::new(Mutex::new(None))
}

/// Tears down whatever the run cell holds. Collect-and-continue: every
/// sub-step runs even when earlier ones fail, the state machine always
/// reaches `Stopped`, and the collected failures are reported afterwards.
///
/// The order is fixed: control channel first (so no new node commands land on
/// a dying network), then directly supervised processes, then a force-kill
/// sweep of every pid still in the process table.
pub(crate) async fn teardown(cell: &RunCell, status: &SharedStatus) -> Result<(), FoundationError> {
    let run = cell.lock().await.take();
    let mut failures: Vec<String> = Vec::new();

    if let Some(mut run) = run {
        if let Some(control) = run.control.take() {
            control.shutdown();
        }
        for mut process in run.processes.drain(..) {
            if let Err(e) = process.kill().await {
                failures.push(e.to_string());
            }
        }
        if let Some(table) = run.table.take() {
            for name in table.lock().await.kill_all().await {
                failures.push(format!("failed to kill node '{name}'"));
            }
        }
        // Dropping the TempDir removes the working directory.
        drop(run.base_dir);
    }

    set_status(status, FoundationStatus::Stopped);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(FoundationError::Shutdown {
            reason: failures.join("; "),
        })
    }
}

/// Guards the `Stopped|Failed --start--> Starting` transition. A second
/// `start()` while `Running` or `Starting` is rejected.
pub(crate) fn begin_start(status: &SharedStatus) -> Result<(), FoundationError> {
    match read_status(status) {
        FoundationStatus::Running { .. } => Err(FoundationError::Startup {
            reason: "foundation is already running; stop it before starting again".into(),
        }),
        FoundationStatus::Starting => Err(FoundationError::Startup {
            reason: "foundation start is already in flight".into(),
        }),
        FoundationStatus::Stopped | FoundationStatus::Failed { .. } => {
            set_status(status, FoundationStatus::Starting);
            Ok(())
        }
    }
}

/// Fails fast (no I/O) when the foundation is not `Running`.
pub(crate) fn require_running(status: &SharedStatus) -> Result<(), FoundationError> {
    let current = read_status(status);
    if current.is_running() {
        Ok(())
    } else {
        Err(FoundationError::HealthCheck {
            reason: format!("foundation is {}, not running", current.label()),
        })
    }
}

/// A one-shot teardown capability scoped to a particular `start()` call,
/// independent from the service-level `stop()`. Consuming it tears down
/// exactly the resources that start call provisioned.
#[derive(Debug)]
pub struct StopHandle {
    pub(crate) cell: RunCell,
    pub(crate) status: SharedStatus,
}

impl StopHandle {
    /// Tears down the resources of the originating `start()` call.
    pub async fn stop(self) -> Result<(), FoundationError> {
        teardown(&self.cell, &self.status).await
    }
}

/// Produced by a successful `start()` call.
#[derive(Debug)]
pub struct StartOutcome {
    /// The running network's description.
    pub info: RunningInfo,
    /// One-shot teardown capability for this start call.
    pub stop: StopHandle,
}

/// The uniform per-topology contract.
///
/// State machine: `Stopped --start--> Starting --success--> Running --stop-->
/// Stopped`, `Starting --failure--> Failed`. `Failed` is not terminal; a
/// subsequent `start()` resets state. `stop()` when not running is a no-op.
#[async_trait]
pub trait Foundation: Send {
    /// Brings the topology up and returns its running description plus a
    /// one-shot stop capability. A failure leaves no partially-started
    /// resources behind.
    async fn start(&mut self) -> Result<StartOutcome, FoundationError>;

    /// Tears the topology down. Idempotent; collect-and-continue.
    async fn stop(&mut self) -> Result<(), FoundationError>;

    /// The current lifecycle status.
    fn status(&self) -> FoundationStatus;

    /// Liveness probe. Fails without performing I/O when the foundation is
    /// not `Running`; never mutates state.
    async fn health_check(&self) -> Result<(), FoundationError>;
}

/// Closed-enum dispatch over the four topologies.
pub enum FoundationVariant {
    /// A single local development node.
    Dev(crate::dev::DevFoundation),
    /// A forked/replay node under chopsticks.
    Chopsticks(crate::chopsticks::ChopsticksFoundation),
    /// A multi-node relay + parachain network.
    Zombie(crate::zombie::ZombieFoundation),
    /// A read-only connection to an existing network.
    ReadOnly(crate::read_only::ReadOnlyFoundation),
}

impl FoundationVariant {
    /// Builds the service matching the configured topology.
    pub fn from_config(config: FoundationConfig) -> Self {
        match config {
            FoundationConfig::Dev(c) => Self::Dev(crate::dev::DevFoundation::new(c)),
            FoundationConfig::Chopsticks(c) => {
                Self::Chopsticks(crate::chopsticks::ChopsticksFoundation::new(c))
            }
            FoundationConfig::Zombie(c) => Self::Zombie(crate::zombie::ZombieFoundation::new(c)),
            FoundationConfig::ReadOnly(c) => {
                Self::ReadOnly(crate::read_only::ReadOnlyFoundation::new(c))
            }
        }
    }

    /// The topology label.
    pub fn topology(&self) -> &'static str {
        match self {
            Self::Dev(_) => "dev",
            Self::Chopsticks(_) => "chopsticks",
            Self::Zombie(_) => "zombie",
            Self::ReadOnly(_) => "read_only",
        }
    }

    /// The zombie service, when this variant is one.
    pub fn as_zombie(&self) -> Option<&crate::zombie::ZombieFoundation> {
        match self {
            Self::Zombie(z) => Some(z),
            _ => None,
        }
    }
}

#[async_trait]
impl Foundation for FoundationVariant {
    async fn start(&mut self) -> Result<StartOutcome, FoundationError> {
        match self {
            Self::Dev(f) => f.start().await,
            Self::Chopsticks(f) => f.start().await,
            Self::Zombie(f) => f.start().await,
            Self::ReadOnly(f) => f.start().await,
        }
    }

    async fn stop(&mut self) -> Result<(), FoundationError> {
        match self {
            Self::Dev(f) => f.stop().await,
            Self::Chopsticks(f) => f.stop().await,
            Self::Zombie(f) => f.stop().await,
            Self::ReadOnly(f) => f.stop().await,
        }
    }

    fn status(&self) -> FoundationStatus {
        match self {
            Self::Dev(f) => f.status(),
            Self::Chopsticks(f) => f.status(),
            Self::Zombie(f) => f.status(),
            Self::ReadOnly(f) => f.status(),
        }
    }

    async fn health_check(&self) -> Result<(), FoundationError> {
        match self {
            Self::Dev(f) => f.health_check().await,
            Self::Chopsticks(f) => f.health_check().await,
            Self::Zombie(f) => f.health_check().await,
            Self::ReadOnly(f) => f.health_check().await,
        }
    }
}
