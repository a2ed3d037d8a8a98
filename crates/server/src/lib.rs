//! Storage server: accepts uploaded batches, persists their leaf hashes,
//! and serves any stored file together with its inclusion proof.

pub mod api;
pub mod server;
pub mod store;

pub use api::router;
pub use server::{Server, ServerError};
pub use store::{JsonStore, LeafStore, MemStore, StoreError};
