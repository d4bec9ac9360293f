//! Pretty-printed JSON working copies

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{FormplaneError, Result};

use super::ConfigStore;

/// Hex SHA-256 of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Stores each document as pretty JSON, replacing files atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl JsonFileStore {
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl<C> ConfigStore<C> for JsonFileStore
where
    C: Serialize + DeserializeOwned,
{
    fn load(&self, path: &Path) -> Result<C> {
        let bytes = fs::read(path)
            .map_err(|e| FormplaneError::io(e, format!("Failed to read {}", path.display())))?;
        let config = serde_json::from_slice(&bytes).map_err(|e| {
            FormplaneError::serialization(e, format!("Failed to parse {}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded working copy");
        Ok(config)
    }

    fn write(&self, config: &C, path: &Path) -> Result<String> {
        let mut bytes = serde_json::to_vec_pretty(config).map_err(|e| {
            FormplaneError::serialization(e, format!("Failed to serialize {}", path.display()))
        })?;
        bytes.push(b'\n');

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                FormplaneError::io(e, format!("Failed to create {}", parent.display()))
            })?;
        }

        let temp = Self::temp_path(path);
        fs::write(&temp, &bytes)
            .map_err(|e| FormplaneError::io(e, format!("Failed to write {}", temp.display())))?;
        fs::rename(&temp, path)
            .map_err(|e| FormplaneError::io(e, format!("Failed to replace {}", path.display())))?;

        let sum = checksum(&bytes);
        tracing::info!(path = %path.display(), checksum = %sum, "wrote working copy");
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GatewayConfig;

    #[test]
    fn write_then_load_returns_same_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gateway.json");
        let store = JsonFileStore::new();
        let config = GatewayConfig { name: "edge".to_string(), ..GatewayConfig::default() };

        let sum = store.write(&config, &path).unwrap();
        let loaded: GatewayConfig = store.load(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(sum, checksum(&fs::read(&path).unwrap()));
        assert!(!JsonFileStore::temp_path(&path).exists());
    }

    #[test]
    fn checksum_is_hex_sha256() {
        assert_eq!(
            checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn load_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let result: Result<GatewayConfig> = JsonFileStore::new().load(&missing);
        let error = result.unwrap_err();
        assert!(matches!(error, FormplaneError::Io { .. }));
        assert!(error.to_string().contains("missing.json"));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let result: Result<GatewayConfig> = JsonFileStore::new().load(&broken);
        assert!(matches!(result, Err(FormplaneError::Serialization { .. })));
    }
}
