//! Upload/request core.
//!
//! One `Server` owns the file handler, the leaf-hash store, the
//! in-progress indexed builders and the finished trees. Uploads for a
//! root accumulate in its builder; the tree materialises when the last
//! slot fills. Requests are served only from finished trees.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::info;

use veristore_common::FileStore;
use veristore_merkle::{
    hash_reader, indexed_leaf, sha256, HasherFactory, IndexedBuilder, MerkleError, MerkleTree,
    Proof,
};

use crate::store::{LeafStore, StoreError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unknown or unfinished tree for root {0}")]
    UnknownTree(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct Server {
    files: Arc<dyn FileStore>,
    db: Arc<dyn LeafStore>,
    builders: Mutex<HashMap<String, IndexedBuilder>>,
    trees: RwLock<HashMap<String, MerkleTree>>,
    hasher: HasherFactory,
}

impl Server {
    /// Rebuilds server state from the persisted leaf hashes: complete
    /// batches become trees, incomplete ones become resumable builders.
    pub fn new(files: Arc<dyn FileStore>, db: Arc<dyn LeafStore>) -> Result<Self, ServerError> {
        let hasher = sha256();
        let mut builders = HashMap::new();
        let mut trees = HashMap::new();

        for (root, slots) in db.read_all() {
            let mut builder = IndexedBuilder::with_hasher(slots.len(), hasher.clone());
            for (index, slot) in slots.into_iter().enumerate() {
                if let Some(hash) = slot {
                    builder.add_hash(index, hash)?;
                }
            }
            if builder.is_complete() {
                trees.insert(root, builder.build()?);
            } else {
                builders.insert(root, builder);
            }
        }

        Ok(Self {
            files,
            db,
            builders: Mutex::new(builders),
            trees: RwLock::new(trees),
            hasher,
        })
    }

    /// Stores upload `index` of `total` under `root` and feeds its hash
    /// to the root's builder. The content is hashed from what actually
    /// landed in the file store, not from the request buffer.
    pub fn upload(
        &self,
        root: &str,
        index: usize,
        total: usize,
        mut content: &[u8],
    ) -> Result<(), ServerError> {
        let path = format!("{root}/{index}");
        self.files.save(&path, &mut content)?;

        let reader = self.files.open(&path)?;
        let hash = hash_reader(&self.hasher, reader)?;
        self.db.save(root, index, total, &hash)?;

        let mut builders = self.builders.lock();
        let builder = builders
            .entry(root.to_string())
            .or_insert_with(|| IndexedBuilder::with_hasher(total, self.hasher.clone()));
        let done = builder.add_hash(index, hash.clone())?;

        info!(root, index, hash = %hash.to_hex(), "uploaded");

        if done {
            if let Some(builder) = builders.remove(root) {
                let tree = builder.build()?;
                self.trees.write().insert(root.to_string(), tree);
            }
        }
        Ok(())
    }

    /// Returns the stored bytes for `index` under `root` together with
    /// the inclusion proof for its positional leaf.
    pub fn request(&self, root: &str, index: usize) -> Result<(Vec<u8>, Proof), ServerError> {
        let trees = self.trees.read();
        let tree = trees
            .get(root)
            .ok_or_else(|| ServerError::UnknownTree(root.to_string()))?;

        let mut reader = self.files.open(&format!("{root}/{index}"))?;
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        let content_hash = self.db.get(root, index)?;
        let leaf = indexed_leaf(&self.hasher, index, &content_hash);
        let proof = tree.proof_for(&leaf)?;

        info!(root, index, proof = ?proof, "request");

        Ok((content, proof))
    }
}
