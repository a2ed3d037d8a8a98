//! Merkle tree construction and traversal.
//!
//! Nodes live in a hash-keyed arena; parent and child links are
//! hash-valued lookups into it, which keeps the tree free of reference
//! cycles and trivially movable. Levels are built bottom-up: adjacent
//! entries pair into `H(left || right)`, an odd tail entry is promoted
//! unchanged to the next level.

use std::collections::HashMap;

use crate::error::MerkleError;
use crate::hasher::{sum_pair, Hash, HasherFactory};
use crate::proof::Proof;

struct Node {
    hash: Hash,
    parent: Option<Hash>,
    children: Option<(Hash, Hash)>,
}

/// Immutable commitment over an ordered batch of level-0 hashes.
pub struct MerkleTree {
    nodes: HashMap<Hash, Node>,
    root: Hash,
    height: usize,
    hasher: HasherFactory,
}

impl MerkleTree {
    /// Builds a tree whose leaf level is `leaves`, taken verbatim.
    ///
    /// No positional binding is applied here; the builders do that before
    /// calling in. Duplicate hashes collapse into one node record (the
    /// last written wins), which callers needing distinct slots avoid by
    /// going through the indexed builder.
    pub fn from_leaf_hashes(
        hasher: HasherFactory,
        leaves: Vec<Hash>,
    ) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::InvalidInputs);
        }

        let mut nodes = HashMap::with_capacity(2 * leaves.len());
        for leaf in &leaves {
            nodes.insert(
                leaf.clone(),
                Node {
                    hash: leaf.clone(),
                    parent: None,
                    children: None,
                },
            );
        }

        let mut height = 1;
        let mut current = leaves;
        while current.len() > 1 {
            current = build_level(&hasher, &mut nodes, current)?;
            height += 1;
        }
        let root = current.remove(0);

        Ok(Self {
            nodes,
            root,
            height,
            hasher,
        })
    }

    pub fn root(&self) -> &Hash {
        &self.root
    }

    /// Number of levels, counting the leaf level. A single leaf gives 1.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Hashes on level `index`, where level 0 is the root and higher
    /// indices are closer to the leaves. A node promoted past a level
    /// reproduces itself on it.
    pub fn level(&self, index: usize) -> Result<Vec<Hash>, MerkleError> {
        if index >= self.height {
            return Err(MerkleError::LevelOutOfRange {
                level: index,
                height: self.height,
            });
        }

        let mut current = vec![self.root.clone()];
        for _ in 0..index {
            let mut next = Vec::with_capacity(current.len() * 2);
            for hash in &current {
                match self.nodes.get(hash).and_then(|n| n.children.as_ref()) {
                    Some((left, right)) => {
                        next.push(left.clone());
                        next.push(right.clone());
                    }
                    None => next.push(hash.clone()),
                }
            }
            current = next;
        }
        Ok(current)
    }

    /// Inclusion proof for the node whose hash is `target`: the target
    /// hash followed by a `(sibling, parent)` pair per pairing on the way
    /// up. Levels where the node was promoted contribute nothing; the walk
    /// follows parent pointers, not level indices.
    pub fn proof_for(&self, target: &Hash) -> Result<Proof, MerkleError> {
        let mut node = self
            .nodes
            .get(target)
            .ok_or_else(|| MerkleError::NotFound(target.to_hex()))?;

        let mut hashes = vec![node.hash.clone()];
        while node.hash != self.root {
            let parent = node
                .parent
                .as_ref()
                .and_then(|p| self.nodes.get(p))
                .ok_or(MerkleError::InvalidTreeState("non-root node without parent"))?;
            let (left, right) = parent
                .children
                .as_ref()
                .ok_or(MerkleError::InvalidTreeState("parent without children"))?;
            let sibling = if node.hash == *right { left } else { right };
            hashes.push(sibling.clone());
            hashes.push(parent.hash.clone());
            node = parent;
        }

        Ok(Proof::new(self.hasher.clone(), hashes))
    }
}

fn build_level(
    hasher: &HasherFactory,
    nodes: &mut HashMap<Hash, Node>,
    level: Vec<Hash>,
) -> Result<Vec<Hash>, MerkleError> {
    let mut next = Vec::with_capacity(level.len() / 2 + 1);

    for pair in level.chunks_exact(2) {
        let parent = sum_pair(hasher, &pair[0], &pair[1]);
        nodes.insert(
            parent.clone(),
            Node {
                hash: parent.clone(),
                parent: None,
                children: Some((pair[0].clone(), pair[1].clone())),
            },
        );
        for child in pair {
            nodes
                .get_mut(child)
                .ok_or(MerkleError::InvalidTreeState("child record missing"))?
                .parent = Some(parent.clone());
        }
        next.push(parent);
    }

    if level.len() % 2 == 1 {
        // Promoted unchanged; its record is only touched once it pairs up
        // on a later level.
        next.push(level[level.len() - 1].clone());
    }

    Ok(next)
}
