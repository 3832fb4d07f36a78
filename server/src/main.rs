#![forbid(unsafe_code)]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use nftlint_harness::config::ValidatorConfig;
use nftlint_harness::pipeline::Validator;
use nftlint_server::{build_router, AppState};

/// QRL NFT descriptor linting service.
#[derive(Debug, Parser)]
#[command(name = "nftlint-server", version)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "NFTLINT_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// JSON validator config (scratch dir and rule settings).
    #[arg(long, env = "NFTLINT_CONFIG")]
    config: Option<PathBuf>,

    /// Scratch directory for lint input; overrides the config file.
    #[arg(long, env = "NFTLINT_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ValidatorConfig::from_env(),
    };
    if let Some(dir) = args.scratch_dir {
        config.scratch_dir = dir;
    }

    let validator = Validator::from_config(&config).context("building rule set")?;
    tracing::info!(scratch_dir = %validator.scratch().path().display(), "validator ready");

    let app = build_router(AppState::new(Arc::new(validator)));
    let listener = TcpListener::bind((args.host, args.port))
        .await
        .with_context(|| format!("binding {}:{}", args.host, args.port))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        "QRL-NFT linting microservice listening on port {}",
        args.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
