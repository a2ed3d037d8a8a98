use clap::Parser;
use tracing::Level;

use veristore_client::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(false)
        .init();

    run(Cli::parse()).await
}
