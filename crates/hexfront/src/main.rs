//! hexfront server binary.
//!
//! Settings come from the environment:
//! - `HEXFRONT_ADDR`: listen address (default `127.0.0.1:8000`)
//! - `HEXFRONT_LOG`: log filter when `RUST_LOG` is unset (default `info`)
//! - `HEXFRONT_SCENARIO`: path to a JSON match scenario

use hexfront::{HexfrontError, HexfrontServerBuilder, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), HexfrontError> {
    let config = ServerConfig::from_env();
    init_tracing(&config.log_level);

    let match_config = config.load_match_config()?;
    tracing::info!(
        addr = %config.addr,
        scenario = ?config.scenario,
        "starting hexfront"
    );

    let server = HexfrontServerBuilder::from_config(&config)
        .match_config(match_config)
        .build()
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = shutdown_signal() => tracing::info!("shutdown requested"),
    }

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
