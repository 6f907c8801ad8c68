//! Persistent admin config document.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// The admin config stored as `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Argon2 PHC string, never plaintext
    #[serde(default)]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub google_maps_api_key: String,

    #[serde(default)]
    pub ip_geolocation_api: String,
}

impl AdminConfig {
    pub fn password_configured(&self) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| !hash.is_empty())
    }
}

/// File-backed store for [`AdminConfig`].
///
/// Reads hand out snapshots; updates are serialized behind the write lock
/// and only become visible once they are on disk.
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<AdminConfig>,
}

impl ConfigStore {
    /// Load the document at `path`, writing defaults if it does not exist.
    ///
    /// A file that exists but does not parse is a configuration error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, DashboardError> {
        let path = path.into();

        let current = if fs::try_exists(&path).await? {
            let data = fs::read_to_string(&path).await?;
            serde_json::from_str(&data).map_err(|e| {
                DashboardError::Config(format!("{} is not valid JSON: {}", path.display(), e))
            })?
        } else {
            let defaults = AdminConfig::default();
            write_document(&path, &defaults).await?;
            info!(path = %path.display(), "Created default config file");
            defaults
        };

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current document.
    pub async fn snapshot(&self) -> AdminConfig {
        self.current.read().await.clone()
    }

    /// Apply `change`, persist, and return the new document.
    pub async fn update<F>(&self, change: F) -> Result<AdminConfig, DashboardError>
    where
        F: FnOnce(&mut AdminConfig),
    {
        let mut current = self.current.write().await;
        let mut next = current.clone();
        change(&mut next);

        write_document(&self.path, &next).await?;
        *current = next.clone();

        debug!(path = %self.path.display(), "Config saved");
        Ok(next)
    }

    /// Write the current document back to disk.
    pub async fn save(&self) -> Result<(), DashboardError> {
        let current = self.current.read().await;
        write_document(&self.path, &current).await
    }
}

/// Pretty-print `config` to `path` through a temp file and rename.
async fn write_document(path: &Path, config: &AdminConfig) -> Result<(), DashboardError> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| DashboardError::Storage(format!("JSON serialization error: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let store = ConfigStore::load(&path).await.unwrap();
        assert_eq!(store.snapshot().await, AdminConfig::default());

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"password_hash\": null,\n  \"google_maps_api_key\": \"\",\n  \"ip_geolocation_api\": \"\"\n}"
        );
    }

    #[tokio::test]
    async fn test_existing_document_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"password_hash": "$argon2id$v=19$m=19456,t=2,p=1$abc$def", "google_maps_api_key": "gm", "ip_geolocation_api": "tok"}"#,
        )
        .unwrap();

        let config = ConfigStore::load(&path).await.unwrap().snapshot().await;
        assert!(config.password_configured());
        assert_eq!(config.google_maps_api_key, "gm");
        assert_eq!(config.ip_geolocation_api, "tok");
    }

    #[tokio::test]
    async fn test_missing_keys_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let config = ConfigStore::load(&path).await.unwrap().snapshot().await;
        assert_eq!(config, AdminConfig::default());
        assert!(!config.password_configured());
    }

    #[tokio::test]
    async fn test_malformed_document_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigStore::load(&path).await.err().unwrap();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::load(&path).await.unwrap();
        store
            .update(|c| c.google_maps_api_key = "new-key".into())
            .await
            .unwrap();

        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert_eq!(reloaded.snapshot().await.google_maps_api_key, "new-key");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_restores_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::load(&path).await.unwrap();
        store
            .update(|c| c.ip_geolocation_api = "tok".into())
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        store.save().await.unwrap();
        let written: AdminConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.ip_geolocation_api, "tok");
    }
}
