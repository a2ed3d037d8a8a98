//! Server config loader using TOML and serde.
//! Every field is optional in the file; defaults cover local development.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    /// Bind address for the HTTP API (e.g., "0.0.0.0:3333").
    pub bind_addr: Option<String>,

    /// Directory where uploaded files and backup.json live.
    pub data_dir: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or("0.0.0.0:3333")
    }

    pub fn data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or("./data")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load config from a TOML file path.
/// If the file is missing or fails to parse, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
    let s = fs::read_to_string(path.as_ref())?;
    let cfg: ServerConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_missing_fields() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3333");
        assert_eq!(cfg.data_dir(), "./data");
    }

    #[test]
    fn load_from_file_round_trip() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            tmp,
            r#"
            bind_addr = "127.0.0.1:4000"
            data_dir = "/tmp/veristore"
            "#
        )
        .expect("write");

        let cfg = load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg.bind_addr(), "127.0.0.1:4000");
        assert_eq!(cfg.data_dir(), "/tmp/veristore");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_from_file("/definitely/not/here.toml").is_err());
    }
}
