// Path: crates/ipc/src/lib.rs
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

//! # Plinth IPC
//!
//! The control channel for an already-running multi-node network: a Unix
//! domain socket created in the network's temporary directory, speaking a
//! single-JSON-object-per-connection request/response protocol. Out-of-process
//! test code uses [`ControlClient`] to restart, pause, resume, kill, and probe
//! nodes without re-entering the orchestrator process.
//!
//! The [`ProcessTable`] is the single source of truth for tracked node pids,
//! shared between the server's `kill` command and the foundation's stop path.

pub mod client;
pub mod protocol;
pub mod server;
pub mod table;

pub use client::ControlClient;
pub use protocol::{ControlCommand, ControlRequest, ControlResponse, ResponseStatus};
pub use server::ControlServer;
pub use table::{NodeEntry, ProcessTable, RelaunchSpec, SharedProcessTable};

#[cfg(test)]
mod tests;
