use thiserror::Error;

use veristore_merkle::MerkleError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Download requested for a root this client never uploaded.
    #[error("unknown root hash {0}")]
    UnknownRoot(String),

    #[error("invalid server response {status} error '{message}'")]
    Server { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Tree construction or proof verification failure.
    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid root encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("response contains invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("roots file: {0}")]
    RootsFile(#[from] serde_json::Error),
}
