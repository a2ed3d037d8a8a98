//! Shared pieces of the veristore system: the file-handler abstraction
//! used on both sides of the wire, and the server configuration loader.

pub mod config;
pub mod files;
pub mod wire;

pub use config::{load_from_file, ConfigError, ServerConfig};
pub use files::{FileStore, MemFiles, OsFiles};
