//! Self-contained inclusion proofs and their verification.

use std::fmt;

use crate::error::MerkleError;
use crate::hasher::{sum_pair, Hash, HasherFactory};

/// Ordered hash sequence `[leaf, (sibling, parent)*]` whose last element
/// is the root. Carries the factory it must be verified under, so a proof
/// received over the wire is reconstructed with [`Proof::new`] and then
/// verified without further context.
pub struct Proof {
    hashes: Vec<Hash>,
    hasher: HasherFactory,
}

impl Proof {
    pub fn new(hasher: HasherFactory, hashes: Vec<Hash>) -> Self {
        Self { hashes, hasher }
    }

    pub fn hashes(&self) -> &[Hash] {
        &self.hashes
    }

    /// Checks that `leaf` is committed under `root` by this proof.
    ///
    /// Each step accepts either concatenation order, `H(current || sibling)`
    /// or `H(sibling || current)`; the proof carries no left/right bits.
    /// Integrity holds regardless because every claimed parent must itself
    /// hash upward into `root`.
    pub fn verify(&self, leaf: &Hash, root: &Hash) -> Result<(), MerkleError> {
        if self.hashes.is_empty() || self.hashes.len() % 2 == 0 {
            return Err(MerkleError::MalformedProof(self.hashes.len()));
        }
        if self.hashes[0] != *leaf {
            return Err(MerkleError::InvalidStartLeaf);
        }

        let mut current = leaf.clone();
        let mut i = 1;
        while i < self.hashes.len() {
            let sibling = &self.hashes[i];
            let parent = &self.hashes[i + 1];
            let first = sum_pair(&self.hasher, &current, sibling);
            let second = sum_pair(&self.hasher, sibling, &current);
            if first != *parent && second != *parent {
                return Err(MerkleError::CannotVerify {
                    left: first.to_hex(),
                    right: second.to_hex(),
                    expected: parent.to_hex(),
                });
            }
            current = parent.clone();
            i += 2;
        }

        if current != *root {
            return Err(MerkleError::RootMismatch {
                got: current.to_hex(),
                want: root.to_hex(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hashes.iter().map(Hash::to_hex))
            .finish()
    }
}
