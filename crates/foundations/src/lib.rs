// Path: crates/foundations/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Plinth Foundations
//!
//! Per-topology lifecycle services for the plinth harness. A *foundation* is
//! the strategy by which the node(s)-under-test are provisioned: a single dev
//! node, a forked node under chopsticks, a multi-node zombie network, or a
//! read-only connection to an existing network.
//!
//! Every topology exposes the same [`Foundation`] contract
//! (`start`/`stop`/`status`/`health_check`) over the shared state machine
//! `Stopped → Starting → Running | Failed`. A failure during `start` tears
//! down whatever was already provisioned before the error surfaces; `stop`
//! is idempotent and collect-and-continue.

pub mod chopsticks;
pub mod dev;
pub mod foundation;
mod network;
pub mod process;
pub mod read_only;
pub mod zombie;

pub use chopsticks::ChopsticksFoundation;
pub use dev::DevFoundation;
pub use foundation::{Foundation, FoundationVariant, StartOutcome, StopHandle};
pub use process::{LaunchCmd, ProcessSupervisor, RunningProcess};
pub use read_only::ReadOnlyFoundation;
pub use zombie::ZombieFoundation;
