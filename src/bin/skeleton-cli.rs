use std::path::PathBuf;

use clap::{Parser, Subcommand};

use skeleton_api::config::{load_config, AppConfig};
use skeleton_api::inspect;

#[derive(Parser)]
#[command(name = "skeleton-cli")]
#[command(about = "Offline checks against a skeleton-api config", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and report malformed allow-list entries
    Validate,
    /// Decide whether an address may call the write routes or an operation
    CheckIp {
        address: String,
        /// Operation name, e.g. HolidayController.delete
        #[arg(short, long)]
        operation: Option<String>,
    },
    /// List declared operations with their advice chains
    Operations,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Validate => {
            println!("config OK");
            for malformed in inspect::malformed_entries(&config) {
                eprintln!("warning: {malformed}");
            }
        }
        Commands::CheckIp { address, operation } => {
            let verdict = inspect::check_ip(&config, &address, operation.as_deref());
            let target = operation.as_deref().unwrap_or("write routes");
            println!("{target}: {address} {verdict}");
        }
        Commands::Operations => {
            for (name, chain) in inspect::advice_chains(&config) {
                println!("{name}: [{}]", chain.join(", "));
            }
        }
    }

    Ok(())
}
