//! Command-line front-end.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use veristore_common::OsFiles;

use crate::api::ApiClient;
use crate::uploader::Uploader;

const SERVER_ENV: &str = "VERISTORE_SERVER";

/// veristore — upload files against a Merkle commitment, download them
/// later with cryptographic proof that the bytes are unchanged.
#[derive(Parser)]
#[command(name = "veristore", version)]
pub struct Cli {
    /// Storage server URL; falls back to the VERISTORE_SERVER
    /// environment variable.
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a set of files; prints the Merkle root to keep.
    Upload {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Download files by index under a previously uploaded root; each is
    /// written to ROOT/INDEX after its proof verifies.
    Download {
        root: String,
        #[arg(required = true)]
        indexes: Vec<usize>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let server_url = cli
        .server
        .or_else(|| std::env::var(SERVER_ENV).ok())
        .with_context(|| format!("--server not provided and {SERVER_ENV} not set"))?;

    let files = Arc::new(OsFiles::new("."));
    let client = Arc::new(ApiClient::new(server_url));
    let uploader = Uploader::new(files, client);

    match cli.command {
        Command::Upload { paths } => {
            let root = uploader.upload(&paths).await?;
            println!("files uploaded");
            println!("merkle root: {root}");
            println!("use it to retrieve your files");
        }
        Command::Download { root, indexes } => {
            uploader.download(&root, &indexes).await?;
            println!("files downloaded");
            for index in indexes {
                println!("\t{root}/{index}");
            }
        }
    }
    Ok(())
}
