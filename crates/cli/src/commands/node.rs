// Path: crates/cli/src/commands/node.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use plinth_ipc::ControlClient;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct NodeArgs {
    /// Control socket of the running network (printed by `plinth run`).
    #[clap(long)]
    pub socket: PathBuf,

    #[clap(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Query a node's liveness.
    Isup { name: String },
    /// Restart a node (does not require it to be alive).
    Restart { name: String },
    /// Suspend a node's process.
    Pause { name: String },
    /// Resume a suspended node's process.
    Resume { name: String },
    /// Kill a node's process.
    Kill { name: String },
    /// Print the node name → pid map.
    Map,
}

pub async fn run(args: NodeArgs) -> Result<()> {
    let client = ControlClient::new(&args.socket);
    match args.command {
        NodeCommands::Isup { name } => {
            let up = client.is_up(&name).await?;
            println!("{name}: {}", if up { "up" } else { "down" });
        }
        NodeCommands::Restart { name } => {
            client.restart_node(&name).await?;
            println!("{name}: restarted");
        }
        NodeCommands::Pause { name } => {
            client.pause_node(&name).await?;
            println!("{name}: paused");
        }
        NodeCommands::Resume { name } => {
            client.resume_node(&name).await?;
            println!("{name}: resumed");
        }
        NodeCommands::Kill { name } => {
            client.kill_node(&name).await?;
            println!("{name}: killed");
        }
        NodeCommands::Map => {
            let map = client.network_map().await?;
            for (name, pid) in map {
                println!("{name}: {pid}");
            }
        }
    }
    Ok(())
}
