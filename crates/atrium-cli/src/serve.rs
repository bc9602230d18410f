//! # Serve Subcommand
//!
//! Runs the HTTP API server. Credentials come from `--api-keys` or the
//! `ATRIUM_API_KEYS` environment variable, in the
//! `actor:token:tenant-uuid` comma-separated format.

use anyhow::Context;
use clap::Args;

use atrium_api::{app, ApiKeys, AppState};

/// Arguments for the serve subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "ATRIUM_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// API credentials, `actor:token:tenant-uuid` comma-separated.
    #[arg(long, env = "ATRIUM_API_KEYS")]
    pub api_keys: String,
}

/// Bind and serve until the process is stopped.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let keys: ApiKeys = args
        .api_keys
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("parsing --api-keys")?;
    if keys.is_empty() {
        anyhow::bail!("no API keys configured; every /v1 route would reject");
    }

    let state = AppState::new(keys);
    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;
    tracing::info!(addr = %args.addr, "atrium API listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
