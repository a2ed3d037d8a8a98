//! Merkle commitment engine.
//!
//! Construction of a Merkle tree over an ordered batch of leaf hashes,
//! inclusion proofs for any indexed leaf, and independent verification of
//! a proof against a claimed root. A leaf is bound to its slot:
//! `H(decimal_ascii(index) || H(content))`, so reordering or substitution
//! across slots is detectable. When a level has an odd number of entries
//! the final entry is promoted unchanged to the next level.
//!
//! The engine is parameterised by a [`HasherFactory`]; SHA-256 is the
//! default and an identity "append" hasher is provided for tests. All of
//! the engine is synchronous; a built tree and its proofs are immutable
//! and freely shareable.

pub mod builder;
pub mod error;
pub mod hasher;
pub mod proof;
pub mod tree;

pub use builder::{Builder, IndexedBuilder};
pub use error::MerkleError;
pub use hasher::{append, hash_reader, indexed_leaf, sha256, Hash, Hasher, HasherFactory};
pub use proof::Proof;
pub use tree::MerkleTree;
