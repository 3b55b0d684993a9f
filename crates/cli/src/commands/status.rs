// Path: crates/cli/src/commands/status.rs

use anyhow::Result;
use clap::Parser;
use plinth_cli::config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Path to the config file (falls back to PLINTH_CONFIG_PATH).
    #[clap(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let config_path = config::resolve_config_path(args.config);
    let file = config::load_environments(&config_path)?;

    println!("Environments in {}:", config_path.display());
    for env in &file.environments {
        println!("  • {} ({})", env.name, env.foundation.topology());
        for provider in &env.providers {
            let endpoint = provider
                .endpoints
                .first()
                .map(String::as_str)
                .unwrap_or("<no endpoint>");
            println!("      provider '{}' [{}] -> {}", provider.name, provider.kind, endpoint);
        }
    }
    Ok(())
}
