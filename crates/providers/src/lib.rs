// Path: crates/providers/src/lib.rs
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

//! # Plinth Providers
//!
//! Connection management for chain-client providers. Given declarative
//! provider descriptors, the [`ProviderService`] lazily instantiates
//! connectors, establishes live connections with bounded retry and
//! per-attempt timeouts, and guarantees that callers never observe a
//! partially-connected batch: when any provider exhausts its retries, every
//! provider connected earlier in the same batch is disconnected before the
//! error is returned.

pub mod connector;
pub mod eth;
pub mod manager;
pub mod substrate;

pub use connector::{
    resolve_endpoint, ChainClient, Connector, ConnectorFactory, DefaultConnectorFactory,
};
pub use manager::{ConnectSummary, ConnectedProvider, ProviderService};
