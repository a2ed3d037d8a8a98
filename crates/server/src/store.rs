//! Per-root leaf-hash store.
//!
//! The store keeps, for every known root, the ordered content hashes of
//! its uploads (`H(bytes)`, before positional binding). Feeding them back
//! through an indexed builder re-derives the positional leaves, which is
//! what makes the persisted form sufficient to rebuild every tree at
//! startup.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use thiserror::Error;

use veristore_common::FileStore;
use veristore_merkle::Hash;

const BACKUP_FILE: &str = "backup.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown root {0}")]
    UnknownRoot(String),

    #[error("invalid index {index} for root {root}")]
    InvalidIndex { root: String, index: usize },

    #[error("no hash stored at index {index} for root {root}")]
    MissingHash { root: String, index: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("backup serialization: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("backup contains invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

pub trait LeafStore: Send + Sync {
    /// Records the content hash of upload `index` out of `total` under
    /// `root`, sizing the slot list on first contact.
    fn save(
        &self,
        root: &str,
        index: usize,
        total: usize,
        content_hash: &Hash,
    ) -> Result<(), StoreError>;

    fn get(&self, root: &str, index: usize) -> Result<Hash, StoreError>;

    /// Full snapshot, used once at startup to rebuild trees.
    fn read_all(&self) -> HashMap<String, Vec<Option<Hash>>>;
}

/// Plain in-memory store.
#[derive(Default)]
pub struct MemStore {
    hashes: Mutex<HashMap<String, Vec<Option<Hash>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeafStore for MemStore {
    fn save(
        &self,
        root: &str,
        index: usize,
        total: usize,
        content_hash: &Hash,
    ) -> Result<(), StoreError> {
        let mut hashes = self.hashes.lock();
        let slots = hashes
            .entry(root.to_string())
            .or_insert_with(|| vec![None; total]);
        if index >= slots.len() {
            return Err(StoreError::InvalidIndex {
                root: root.to_string(),
                index,
            });
        }
        slots[index] = Some(content_hash.clone());
        Ok(())
    }

    fn get(&self, root: &str, index: usize) -> Result<Hash, StoreError> {
        let hashes = self.hashes.lock();
        let slots = hashes
            .get(root)
            .ok_or_else(|| StoreError::UnknownRoot(root.to_string()))?;
        if index >= slots.len() {
            return Err(StoreError::InvalidIndex {
                root: root.to_string(),
                index,
            });
        }
        slots[index].clone().ok_or_else(|| StoreError::MissingHash {
            root: root.to_string(),
            index,
        })
    }

    fn read_all(&self) -> HashMap<String, Vec<Option<Hash>>> {
        self.hashes.lock().clone()
    }
}

/// Store that mirrors every change into `backup.json` through a file
/// handler, and loads it back on construction.
pub struct JsonStore {
    mem: MemStore,
    files: Arc<dyn FileStore>,
}

impl JsonStore {
    pub fn new(files: Arc<dyn FileStore>) -> Result<Self, StoreError> {
        let mem = MemStore::new();
        match files.open(BACKUP_FILE) {
            Ok(mut reader) => {
                let mut raw = Vec::new();
                reader.read_to_end(&mut raw)?;
                let decoded: HashMap<String, Vec<Option<String>>> =
                    serde_json::from_slice(&raw)?;
                let mut hashes = mem.hashes.lock();
                for (root, slots) in decoded {
                    let mut out = Vec::with_capacity(slots.len());
                    for slot in slots {
                        out.push(match slot {
                            Some(encoded) => Some(Hash::new(BASE64.decode(encoded)?)),
                            None => None,
                        });
                    }
                    hashes.insert(root, out);
                }
                drop(hashes);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(Self { mem, files })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.mem.read_all();
        let encoded: HashMap<String, Vec<Option<String>>> = snapshot
            .into_iter()
            .map(|(root, slots)| {
                let slots = slots
                    .into_iter()
                    .map(|slot| slot.map(|h| BASE64.encode(h.as_bytes())))
                    .collect();
                (root, slots)
            })
            .collect();
        let raw = serde_json::to_vec(&encoded)?;
        self.files.save(BACKUP_FILE, &mut raw.as_slice())?;
        Ok(())
    }
}

impl LeafStore for JsonStore {
    fn save(
        &self,
        root: &str,
        index: usize,
        total: usize,
        content_hash: &Hash,
    ) -> Result<(), StoreError> {
        self.mem.save(root, index, total, content_hash)?;
        self.persist()
    }

    fn get(&self, root: &str, index: usize) -> Result<Hash, StoreError> {
        self.mem.get(root, index)
    }

    fn read_all(&self) -> HashMap<String, Vec<Option<Hash>>> {
        self.mem.read_all()
    }
}
