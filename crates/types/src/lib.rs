// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Plinth Types
//!
//! This crate is the foundational library for the plinth harness, containing
//! the configuration structures, status unions, and error types shared by
//! every other crate in the workspace.
//!
//! ## Architectural Role
//!
//! As the base crate, `plinth-types` has minimal dependencies and is itself a
//! dependency for almost every other crate in the workspace. This structure
//! prevents circular dependencies and provides a stable, canonical definition
//! for shared types like `FoundationConfig`, `NodeInfo`, and the closed error
//! enums.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::FoundationError> = std::result::Result<T, E>;

/// Configuration structures consumed by the foundation and provider services.
pub mod config;
/// Closed error enums and the `ErrorCode` trait.
pub mod error;
/// Status unions and the running-network data model.
pub mod status;

pub use config::{
    ChopsticksConfig, DevConfig, EnvironmentConfig, EnvironmentsFile, FoundationConfig, LaunchSpec,
    ParachainSpec, PortsConfig, ProviderConfig, ProviderKind, ReadOnlyConfig, RelaychainSpec,
    RetryPolicy, ZombieConfig, ZombieNetworkSpec, ZombieNodeSpec,
};
pub use error::{ErrorCode, FoundationError, NodeOperationError, ProviderError};
pub use status::{FoundationStatus, NodeInfo, NodeRole, ProviderServiceStatus, RunningInfo};
