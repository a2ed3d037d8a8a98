//! Upload and download orchestration.
//!
//! Uploading commits first: every file is streamed through the sequential
//! builder, the root is recorded locally, and only then do the files go
//! out (and their local copies get deleted). Downloading is the reverse:
//! fetch, save, re-hash what landed on disk, and verify the proof against
//! the recorded root. A file that fails verification is removed.

use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use veristore_common::FileStore;
use veristore_merkle::{hash_reader, indexed_leaf, sha256, Builder, Hash, HasherFactory};

use crate::error::ClientError;
use crate::remote::RemoteStore;

/// Client-side persisted state: the append-only list of known roots.
const ROOT_FILE: &str = "root";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RootsBackup {
    roots: Vec<String>,
}

pub struct Uploader {
    files: Arc<dyn FileStore>,
    server: Arc<dyn RemoteStore>,
    hasher: HasherFactory,
}

impl Uploader {
    pub fn new(files: Arc<dyn FileStore>, server: Arc<dyn RemoteStore>) -> Self {
        Self {
            files,
            server,
            hasher: sha256(),
        }
    }

    /// Uploads the batch and returns the hex root. The local copies are
    /// deleted as each upload completes; the root is saved before the
    /// first byte leaves the machine.
    pub async fn upload(&self, paths: &[String]) -> Result<String, ClientError> {
        let root = self.commit(paths)?;
        for (index, path) in paths.iter().enumerate() {
            let mut reader = self.files.open(path)?;
            let mut content = Vec::new();
            reader.read_to_end(&mut content)?;
            self.server
                .upload(&root, index, paths.len(), &content)
                .await?;
            self.files.delete(path)?;
        }
        Ok(root)
    }

    /// Downloads the given indexes under a known root, verifying each
    /// file before it is accepted.
    pub async fn download(&self, root: &str, indexes: &[usize]) -> Result<(), ClientError> {
        let known = self.load_roots()?;
        if !known.iter().any(|r| r == root) {
            return Err(ClientError::UnknownRoot(root.to_string()));
        }
        for &index in indexes {
            self.download_index(root, index).await?;
        }
        Ok(())
    }

    fn commit(&self, paths: &[String]) -> Result<String, ClientError> {
        let mut builder = Builder::with_hasher(self.hasher.clone());
        for path in paths {
            builder.add(self.files.open(path)?)?;
        }
        let tree = builder.build()?;
        let root = tree.root().to_hex();
        self.save_root(&root)?;
        Ok(root)
    }

    async fn download_index(&self, root: &str, index: usize) -> Result<(), ClientError> {
        let (content, proof) = self.server.request(root, index).await?;

        let path = format!("{root}/{index}");
        self.files.save(&path, &mut content.as_slice())?;

        // Hash what actually landed on disk, not the response buffer.
        let reader = self.files.open(&path)?;
        let content_hash = hash_reader(&self.hasher, reader)?;
        let leaf = indexed_leaf(&self.hasher, index, &content_hash);
        let expected = Hash::from_hex(root)?;

        if let Err(err) = proof.verify(&leaf, &expected) {
            self.files.delete(&path)?;
            return Err(err.into());
        }
        Ok(())
    }

    fn load_roots(&self) -> Result<Vec<String>, ClientError> {
        let mut reader = match self.files.open(ROOT_FILE) {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let backup: RootsBackup = serde_json::from_slice(&raw)?;
        Ok(backup.roots)
    }

    fn save_root(&self, root: &str) -> Result<(), ClientError> {
        let mut roots = self.load_roots()?;
        roots.push(root.to_string());
        let raw = serde_json::to_vec(&RootsBackup { roots })?;
        self.files.save(ROOT_FILE, &mut raw.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use veristore_common::MemFiles;
    use veristore_merkle::{IndexedBuilder, MerkleTree, Proof};

    /// In-memory stand-in for the storage server: an indexed builder per
    /// root, trees built on completion, proofs served from them.
    #[derive(Default)]
    struct FakeServer {
        store: Mutex<HashMap<String, Vec<u8>>>,
        builders: Mutex<HashMap<String, IndexedBuilder>>,
        trees: Mutex<HashMap<String, MerkleTree>>,
        corrupt_downloads: bool,
    }

    impl FakeServer {
        fn corrupting() -> Self {
            Self {
                corrupt_downloads: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl RemoteStore for FakeServer {
        async fn upload(
            &self,
            root: &str,
            index: usize,
            total: usize,
            content: &[u8],
        ) -> Result<(), ClientError> {
            self.store
                .lock()
                .insert(format!("{root}/{index}"), content.to_vec());

            let mut builders = self.builders.lock();
            let builder = builders
                .entry(root.to_string())
                .or_insert_with(|| IndexedBuilder::new(total));
            let done = builder.add_hash(index, hash_reader(&sha256(), content).unwrap())?;
            if done {
                let builder = builders.remove(root).unwrap();
                self.trees
                    .lock()
                    .insert(root.to_string(), builder.build()?);
            }
            Ok(())
        }

        async fn request(
            &self,
            root: &str,
            index: usize,
        ) -> Result<(Vec<u8>, Proof), ClientError> {
            let mut content = self.store.lock()[&format!("{root}/{index}")].clone();
            let trees = self.trees.lock();
            let tree = trees.get(root).expect("tree not built");

            let content_hash = hash_reader(&sha256(), content.as_slice()).unwrap();
            let leaf = indexed_leaf(&sha256(), index, &content_hash);
            let proof = tree.proof_for(&leaf)?;

            if self.corrupt_downloads {
                content[0] ^= 0xff;
            }
            Ok((content, proof))
        }
    }

    fn setup(items: &[(&str, &[u8])]) -> (Arc<MemFiles>, Uploader) {
        let files = Arc::new(MemFiles::new());
        for (path, content) in items {
            files.save(path, &mut &content[..]).unwrap();
        }
        let uploader = Uploader::new(files.clone(), Arc::new(FakeServer::default()));
        (files, uploader)
    }

    fn paths(items: &[(&str, &[u8])]) -> Vec<String> {
        items.iter().map(|(p, _)| p.to_string()).collect()
    }

    /// The root the server will arrive at: positional leaves in order.
    fn expected_root(items: &[(&str, &[u8])]) -> String {
        let mut builder = IndexedBuilder::new(items.len());
        for (i, (_, content)) in items.iter().enumerate() {
            builder.add(i, *content).unwrap();
        }
        builder.build().unwrap().root().to_hex()
    }

    #[tokio::test]
    async fn upload_computes_the_positional_root() {
        let items: &[(&str, &[u8])] = &[("a", b"file-a"), ("b", b"file-b")];
        let (_, uploader) = setup(items);

        let root = uploader.upload(&paths(items)).await.unwrap();
        assert_eq!(root, expected_root(items));
    }

    #[tokio::test]
    async fn upload_deletes_local_copies_and_records_the_root() {
        let items: &[(&str, &[u8])] = &[("a", b"file-a"), ("b", b"file-b")];
        let (files, uploader) = setup(items);

        let root = uploader.upload(&paths(items)).await.unwrap();

        assert!(!files.contains("a"));
        assert!(!files.contains("b"));
        assert_eq!(uploader.load_roots().unwrap(), vec![root]);
    }

    #[tokio::test]
    async fn roots_accumulate_across_uploads() {
        let first: &[(&str, &[u8])] = &[("a", b"file-a")];
        let (files, uploader) = setup(first);
        let r1 = uploader.upload(&paths(first)).await.unwrap();

        files.save("c", &mut &b"file-c"[..]).unwrap();
        let r2 = uploader.upload(&["c".to_string()]).await.unwrap();

        assert_eq!(uploader.load_roots().unwrap(), vec![r1, r2]);
    }

    #[tokio::test]
    async fn download_round_trip() {
        let items: &[(&str, &[u8])] = &[("a", b"file-a"), ("b", b"file-b"), ("c", b"file-c")];
        let (files, uploader) = setup(items);

        let root = uploader.upload(&paths(items)).await.unwrap();
        uploader.download(&root, &[0, 1, 2]).await.unwrap();

        for index in 0..3 {
            let mut reader = files.open(&format!("{root}/{index}")).unwrap();
            let mut content = Vec::new();
            reader.read_to_end(&mut content).unwrap();
            assert_eq!(content, items[index].1);
        }
    }

    #[tokio::test]
    async fn download_refuses_unknown_root() {
        let items: &[(&str, &[u8])] = &[("a", b"file-a")];
        let (_, uploader) = setup(items);
        uploader.upload(&paths(items)).await.unwrap();

        let err = uploader.download("abcdef", &[0]).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownRoot(_)));
    }

    #[tokio::test]
    async fn corrupted_download_is_rejected_and_removed() {
        let items: &[(&str, &[u8])] = &[("a", b"file-a"), ("b", b"file-b")];
        let files = Arc::new(MemFiles::new());
        for (path, content) in items {
            files.save(path, &mut &content[..]).unwrap();
        }
        let uploader = Uploader::new(files.clone(), Arc::new(FakeServer::corrupting()));

        let root = uploader.upload(&paths(items)).await.unwrap();
        let err = uploader.download(&root, &[0]).await.unwrap_err();

        assert!(matches!(err, ClientError::Merkle(_)));
        assert!(!files.contains(&format!("{root}/0")));
    }
}
