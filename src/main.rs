//! Skeleton API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ SetRequestId → TraceLayer → Timeout → BodyLimit
//!                         │
//!                         ▼
//!                 trace scope (seeded with x-request-id)
//!                         │
//!                         ▼
//!            [check_ip_middleware on write routes]
//!                         │
//!                         ▼
//!        HolidayController.<op>  ──registry──▶  CheckIp? → LogTrace
//!                         │
//!                         ▼
//!        HolidayService.<op>     ──registry──▶  LogTrace (level + 1)
//!                         │
//!                         ▼
//!                 HolidayRepository (DashMap)
//! ```

use std::path::PathBuf;

use clap::Parser;

use skeleton_api::config::{load_config, AppConfig};
use skeleton_api::lifecycle::{bootstrap, Shutdown};

#[derive(Parser)]
#[command(name = "skeleton-api")]
#[command(about = "Holiday API with nested call tracing and IP allow lists", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    let (server, listener) = bootstrap(config).await?;

    let shutdown = Shutdown::new();
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
