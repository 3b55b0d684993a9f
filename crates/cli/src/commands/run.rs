// Path: crates/cli/src/commands/run.rs

use anyhow::Result;
use clap::Parser;
use plinth_cli::{config, Environment};
use std::path::PathBuf;
use tokio::signal;

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Environment to run (falls back to PLINTH_TEST_ENV).
    #[clap(long)]
    pub env: Option<String>,

    /// Path to the config file (falls back to PLINTH_CONFIG_PATH).
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Start the foundation but skip connecting providers.
    #[clap(long)]
    pub no_connect: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config_path = config::resolve_config_path(args.config);
    let file = config::load_environments(&config_path)?;
    let selected = config::select_environment(&file, config::resolve_env_name(args.env).as_deref())?;

    println!("🚀 Starting environment '{}'...", selected.name);
    let mut environment = Environment::from_config(selected);

    let topology = environment.topology();
    let info = environment.start().await?;
    println!("\n✅ Foundation '{}' is running!", topology);
    println!("---------------------------------------------------------");
    for node in &info.nodes {
        println!("Node '{}':", node.name);
        println!("  WS:        {}", node.ws_endpoint);
        if let Some(id) = node.parachain_id {
            println!("  Parachain: {id}");
        }
    }
    if let Some(socket) = &info.control_socket {
        println!("Control socket: {}", socket.display());
    }
    println!("---------------------------------------------------------");

    if !args.no_connect {
        if let Err(e) = environment.connect().await {
            // Never leave a half-started environment behind.
            let _ = environment.destroy().await;
            return Err(e);
        }
        println!(
            "Providers connected: {}",
            environment
                .providers()
                .all_providers()
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    println!("Press Ctrl+C to stop.\n");
    signal::ctrl_c().await?;

    println!("\n🛑 Shutting down environment...");
    environment.destroy().await?;
    println!("Bye!");
    Ok(())
}
