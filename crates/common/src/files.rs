//! File-handler abstraction shared by client and server.
//!
//! Callers address files by relative path; an implementation decides where
//! the bytes live. `open` reports absence through
//! `std::io::ErrorKind::NotFound` so callers can treat a missing file as
//! an empty state where that is meaningful.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

pub trait FileStore: Send + Sync {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
    fn save(&self, path: &str, content: &mut dyn Read) -> io::Result<()>;
    fn delete(&self, path: &str) -> io::Result<()>;
}

/// Filesystem-backed store rooted at a base directory.
#[derive(Clone, Debug)]
pub struct OsFiles {
    base: PathBuf,
}

impl OsFiles {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base.join(path)
    }
}

impl FileStore for OsFiles {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(self.full_path(path))?))
    }

    fn save(&self, path: &str, content: &mut dyn Read) -> io::Result<()> {
        let dest = self.full_path(path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(dest)?;
        io::copy(content, &mut file)?;
        Ok(())
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        match fs::remove_file(self.full_path(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemFiles {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.lock().contains_key(path)
    }
}

impl FileStore for MemFiles {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        match self.entries.lock().get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no entry for {path}"),
            )),
        }
    }

    fn save(&self, path: &str, content: &mut dyn Read) -> io::Result<()> {
        let mut bytes = Vec::new();
        content.read_to_end(&mut bytes)?;
        self.entries.lock().insert(path.to_string(), bytes);
        Ok(())
    }

    fn delete(&self, path: &str) -> io::Result<()> {
        self.entries.lock().remove(path);
        Ok(())
    }
}
