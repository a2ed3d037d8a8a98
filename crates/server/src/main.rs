use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};

use veristore_common::{config, OsFiles, ServerConfig};
use veristore_server::{router, JsonStore, Server};

/// Veristore server — holds uploaded batches and answers download
/// requests with inclusion proofs.
#[derive(Parser)]
#[command(name = "veristore-server", version)]
struct Cli {
    /// Bind address for the HTTP API. Overrides the config file.
    #[arg(long)]
    addr: Option<String>,

    /// Directory for uploaded files and backup.json. Overrides the
    /// config file.
    #[arg(long)]
    data_dir: Option<String>,

    /// Optional TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if cli.addr.is_some() {
        cfg.bind_addr = cli.addr;
    }
    if cli.data_dir.is_some() {
        cfg.data_dir = cli.data_dir;
    }

    let files = Arc::new(OsFiles::new(cfg.data_dir()));
    let db = Arc::new(JsonStore::new(files.clone()).context("loading backup.json")?);
    let server = Arc::new(Server::new(files, db).context("rebuilding trees")?);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr())
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr()))?;
    info!(addr = %listener.local_addr()?, data_dir = cfg.data_dir(), "serving");

    axum::serve(listener, router(server))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
