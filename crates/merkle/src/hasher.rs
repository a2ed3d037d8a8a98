//! Hash output type, the streaming hasher contract, and the hasher
//! factories the engine is parameterised with.
//!
//! Every digest computed by the engine goes through a [`HasherFactory`];
//! nothing outside this module names a concrete algorithm.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use sha2::{Digest, Sha256};

/// Digest output. Width is fixed by the hasher that produced it; all
/// comparisons are byte-equal and the external encoding is lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Hash(Vec<u8>);

impl Hash {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Hash {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Streaming digest: feed bytes with [`write`](Hasher::write), read the
/// current digest with [`sum`](Hasher::sum), start over with
/// [`reset`](Hasher::reset).
pub trait Hasher: Send {
    fn write(&mut self, bytes: &[u8]);
    fn sum(&self) -> Hash;
    fn reset(&mut self);
}

/// Zero-argument producer of a fresh streaming digest.
pub type HasherFactory = Arc<dyn Fn() -> Box<dyn Hasher> + Send + Sync>;

/// Default factory: SHA-256.
pub fn sha256() -> HasherFactory {
    Arc::new(|| Box::new(Sha256Hasher(Sha256::new())))
}

struct Sha256Hasher(Sha256);

impl Hasher for Sha256Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn sum(&self) -> Hash {
        Hash::new(self.0.clone().finalize().to_vec())
    }

    fn reset(&mut self) {
        self.0 = Sha256::new();
    }
}

/// Identity "append" factory: the digest is the concatenation of the
/// written bytes. Not a hash at all; exists so tests can assert tree and
/// proof shapes on readable byte strings.
pub fn append() -> HasherFactory {
    Arc::new(|| Box::new(AppendHasher(Vec::new())))
}

struct AppendHasher(Vec<u8>);

impl Hasher for AppendHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    fn sum(&self) -> Hash {
        Hash::new(self.0.clone())
    }

    fn reset(&mut self) {
        self.0.clear();
    }
}

/// Positional leaf binding: `H(decimal_ascii(index) || content_hash)`.
///
/// The single definition of the binding rule. The builders use it when
/// filling slots, the server uses it to locate a leaf for proof
/// generation, and the client uses it to verify a downloaded file.
pub fn indexed_leaf(hasher: &HasherFactory, index: usize, content_hash: &Hash) -> Hash {
    let mut h = hasher();
    h.write(index.to_string().as_bytes());
    h.write(content_hash.as_bytes());
    h.sum()
}

/// Consume a byte source into a fresh hasher.
pub fn hash_reader<R: Read>(hasher: &HasherFactory, mut input: R) -> std::io::Result<Hash> {
    let mut h = hasher();
    let mut buf = [0u8; 8192];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        h.write(&buf[..n]);
    }
    Ok(h.sum())
}

/// `H(left || right)` under the given factory.
pub(crate) fn sum_pair(hasher: &HasherFactory, left: &Hash, right: &Hash) -> Hash {
    let mut h = hasher();
    h.write(left.as_bytes());
    h.write(right.as_bytes());
    h.sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_vector() {
        let mut h = sha256()();
        h.write(b"abc");
        assert_eq!(
            h.sum().to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_sum_is_not_destructive() {
        let mut h = sha256()();
        h.write(b"ab");
        let first = h.sum();
        h.write(b"c");
        let second = h.sum();
        assert_ne!(first, second);
        assert_eq!(
            second.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_reset_starts_over() {
        let mut h = sha256()();
        h.write(b"junk");
        h.reset();
        h.write(b"abc");
        assert_eq!(
            h.sum().to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn append_concatenates() {
        let mut h = append()();
        h.write(b"0");
        h.write(b"a");
        assert_eq!(h.sum().as_bytes(), b"0a");
    }

    #[test]
    fn indexed_leaf_binds_index() {
        let hasher = append();
        let content = Hash::new(b"a".to_vec());
        assert_eq!(indexed_leaf(&hasher, 0, &content).as_bytes(), b"0a");
        assert_eq!(indexed_leaf(&hasher, 12, &content).as_bytes(), b"12a");
        assert_ne!(
            indexed_leaf(&hasher, 0, &content),
            indexed_leaf(&hasher, 1, &content)
        );
    }

    #[test]
    fn hash_reader_streams_whole_source() {
        let data = vec![0x5au8; 20_000];
        let streamed = hash_reader(&sha256(), data.as_slice()).unwrap();
        let mut h = sha256()();
        h.write(&data);
        assert_eq!(streamed, h.sum());
    }

    #[test]
    fn hex_round_trip() {
        let h = Hash::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(h.to_hex(), "deadbeef");
        assert_eq!(Hash::from_hex("deadbeef").unwrap(), h);
        assert!(Hash::from_hex("not hex").is_err());
    }
}
