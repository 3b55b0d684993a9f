// Path: crates/cli/src/lib.rs
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

//! # Plinth CLI Library
//!
//! High-level orchestration for the plinth harness: the [`Environment`]
//! context that drives a foundation and its providers through one test run.
//!
//! ## Architectural Boundary and Purpose
//!
//! **`plinth-cli` is the primary *external consumer* of the harness.** It
//! composes the library crates the same way a test suite would:
//!
//! 1. **Public API only:** this crate depends only on the public surface of
//!    the other `plinth-*` crates; no internal access.
//! 2. **No core logic:** it composes and drives the foundation and provider
//!    services, it does not reimplement their semantics.
//! 3. **Simulates a user:** the workflows here (starting an environment,
//!    connecting providers, driving nodes over the control channel) are the
//!    same workflows external test code performs.

pub mod config;
pub mod environment;

// Re-export the context for ergonomic top-level access.
pub use environment::Environment;
