//! The two tree builders.
//!
//! The sequential [`Builder`] serves the client flow: sources arrive in
//! order and the arrival position is the index. The [`IndexedBuilder`]
//! serves the server flow: a known batch size filled out of order. Both
//! derive positional leaves through [`indexed_leaf`] and funnel into
//! [`MerkleTree::from_leaf_hashes`].

use std::io::Read;

use crate::error::MerkleError;
use crate::hasher::{hash_reader, indexed_leaf, sha256, Hash, HasherFactory};
use crate::tree::MerkleTree;

/// Sequential builder: each added source occupies the next slot.
pub struct Builder {
    leaves: Vec<Hash>,
    hasher: HasherFactory,
}

impl Builder {
    pub fn new() -> Self {
        Self::with_hasher(sha256())
    }

    pub fn with_hasher(hasher: HasherFactory) -> Self {
        Self {
            leaves: Vec::new(),
            hasher,
        }
    }

    /// Streams `input` to its content hash and appends the positional
    /// leaf for the next slot.
    pub fn add<R: Read>(&mut self, input: R) -> Result<(), MerkleError> {
        let content = hash_reader(&self.hasher, input)?;
        let leaf = indexed_leaf(&self.hasher, self.leaves.len(), &content);
        self.leaves.push(leaf);
        Ok(())
    }

    /// Consumes the builder and constructs the tree.
    pub fn build(self) -> Result<MerkleTree, MerkleError> {
        MerkleTree::from_leaf_hashes(self.hasher, self.leaves)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-sized builder whose slots are filled by index, in any order.
pub struct IndexedBuilder {
    slots: Vec<Option<Hash>>,
    filled: usize,
    hasher: HasherFactory,
}

impl IndexedBuilder {
    pub fn new(size: usize) -> Self {
        Self::with_hasher(size, sha256())
    }

    pub fn with_hasher(size: usize, hasher: HasherFactory) -> Self {
        Self {
            slots: vec![None; size],
            filled: 0,
            hasher,
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Streams `input` to its content hash, then behaves like
    /// [`add_hash`](Self::add_hash). The slot is checked before the
    /// source is consumed.
    pub fn add<R: Read>(&mut self, index: usize, input: R) -> Result<bool, MerkleError> {
        self.check_slot(index)?;
        let content = hash_reader(&self.hasher, input)?;
        self.add_hash(index, content)
    }

    /// Stores the positional leaf for `hash` at `index`. Returns whether
    /// the batch is now complete.
    pub fn add_hash(&mut self, index: usize, hash: Hash) -> Result<bool, MerkleError> {
        self.check_slot(index)?;
        self.slots[index] = Some(indexed_leaf(&self.hasher, index, &hash));
        self.filled += 1;
        Ok(self.is_complete())
    }

    /// Consumes the builder and constructs the tree over the positional
    /// leaves in slot order.
    pub fn build(self) -> Result<MerkleTree, MerkleError> {
        if !self.is_complete() {
            return Err(MerkleError::Incomplete {
                filled: self.filled,
                size: self.slots.len(),
            });
        }
        let leaves = self.slots.into_iter().flatten().collect();
        MerkleTree::from_leaf_hashes(self.hasher, leaves)
    }

    fn check_slot(&self, index: usize) -> Result<(), MerkleError> {
        if index >= self.slots.len() {
            return Err(MerkleError::OutOfRange {
                index,
                size: self.slots.len(),
            });
        }
        if self.slots[index].is_some() {
            return Err(MerkleError::SlotFilled { index });
        }
        Ok(())
    }
}
