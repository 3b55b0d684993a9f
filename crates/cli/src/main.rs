// Path: crates/cli/src/main.rs
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

//! # Plinth CLI
//!
//! Provisions blockchain test environments, connects chain-client providers
//! to them, and exposes node-control operations against running networks.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "plinth",
    version,
    about = "The plinth harness: provision, supervise, and drive blockchain test environments.",
    long_about = "plinth starts one of several foundation topologies (dev, chopsticks, zombie, read-only), connects chain-client providers, and exposes control operations to test code."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an environment, connect its providers, and run until ctrl-c.
    Run(run::RunArgs),

    /// Show the environments a config file declares.
    Status(status::StatusArgs),

    /// Drive a node of a running network over its control channel.
    Node(node::NodeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize basic logging for CLI output
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Status(args) => status::run(args),
        Commands::Node(args) => node::run(args).await,
    }
}
