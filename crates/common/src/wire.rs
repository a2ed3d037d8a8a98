//! JSON envelopes shared by the HTTP API and the client.
//!
//! Digests travel as lowercase hex in the `root` field and as standard
//! base64 in `content` and `proof`, matching what the server persists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub root: String,
    pub index: usize,
    pub total: usize,
    /// File bytes, base64.
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRequest {
    pub root: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofResponse {
    /// File bytes, base64.
    pub content: String,
    /// Proof hash sequence, base64, in leaf-to-root order.
    pub proof: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
