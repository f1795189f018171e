//! Client credential configuration.
//!
//! Credentials live in `client_config.json` next to the data files, a JSON
//! object with `CLIENT_ID` and `CLIENT_SECRET` keys, registered with the
//! provider out of band. Loaded once per process and immutable afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default config path, relative to the working directory.
pub const CONFIG_FILE: &str = "client_config.json";

/// Errors raised while loading the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("missing or empty {key} in {path}")]
    MissingKey { key: &'static str, path: PathBuf },
}

/// OAuth2 client credentials.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Raw file schema. Keys absent from the file deserialize to empty strings
/// and are rejected by the non-empty check in [`load`].
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(rename = "CLIENT_ID", default)]
    client_id: String,
    #[serde(rename = "CLIENT_SECRET", default)]
    client_secret: String,
}

/// Load credentials from the given path.
///
/// Fails with [`ConfigError`] when the file is missing, is not valid JSON,
/// or either key is missing or empty. No side effects.
pub fn load(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: ConfigFile =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if parsed.client_id.trim().is_empty() {
        return Err(ConfigError::MissingKey {
            key: "CLIENT_ID",
            path: path.to_path_buf(),
        });
    }
    if parsed.client_secret.trim().is_empty() {
        return Err(ConfigError::MissingKey {
            key: "CLIENT_SECRET",
            path: path.to_path_buf(),
        });
    }

    Ok(ClientConfig {
        client_id: parsed.client_id,
        client_secret: parsed.client_secret,
    })
}

/// Load credentials from the fixed relative path [`CONFIG_FILE`].
pub fn load_default() -> Result<ClientConfig, ConfigError> {
    load(Path::new(CONFIG_FILE))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
