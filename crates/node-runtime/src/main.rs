//! # Shard-Chain Node Runtime
//!
//! Runs an in-process devnet: a beacon committee and one committee per
//! shard, each member driven by its own consensus engine.
//!
//! Logging honours `RUST_LOG`; without it the `SC_LOG` level applies.

use anyhow::{Context, Result};
use node_runtime::{load_config, Devnet};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.log_level)?;

    info!("===========================================");
    info!("  Shard-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        shards = config.consensus.shard_count,
        committee_size = config.devnet.committee_size,
        mode = %config.consensus.node_mode,
        "Configuration loaded"
    );

    let report_interval = config.devnet.report_interval;
    let devnet = Devnet::new(config).context("Failed to build devnet")?;
    devnet.start().context("Failed to start consensus engines")?;

    info!("Node is running. Press Ctrl+C to stop.");
    let mut ticker = tokio::time::interval(report_interval);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            _ = ticker.tick() => devnet.report(),
        }
    }

    info!("Initiating graceful shutdown...");
    devnet.stop().await;
    info!("Shutdown complete");
    Ok(())
}
