//! The seam between the uploader and the storage server.

use async_trait::async_trait;

use veristore_merkle::Proof;

use crate::error::ClientError;

/// What the uploader needs from a storage server. The production
/// implementation speaks HTTP; tests substitute an in-memory one.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upload(
        &self,
        root: &str,
        index: usize,
        total: usize,
        content: &[u8],
    ) -> Result<(), ClientError>;

    async fn request(&self, root: &str, index: usize) -> Result<(Vec<u8>, Proof), ClientError>;
}
