//! Client side of veristore: local root computation, the HTTP client,
//! and the upload/download orchestration with proof verification.

pub mod api;
pub mod cli;
pub mod error;
pub mod remote;
pub mod uploader;

pub use api::ApiClient;
pub use error::ClientError;
pub use remote::RemoteStore;
pub use uploader::Uploader;
