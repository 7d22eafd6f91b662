use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::CredentialStore;

/// JSON-file backed key/value store.
///
/// The whole map is rewritten on every change using a temp file and an atomic
/// rename. On unix the file is created with mode 0600. A file that cannot be
/// parsed reads as empty and is replaced by the next write.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(BTreeMap::new());
        }

        let bytes = fs::read(&self.path)
            .await
            .context(format!("Failed to read credential store: {:?}", self.path))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_slice(&bytes) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(
                    "Ignoring unreadable credential store {:?}: {}",
                    self.path, err
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create credential store directory")?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "storage.json".to_string());
        let temp_file = self.path.with_file_name(format!(".{}.tmp", file_name));

        let json = serde_json::to_string_pretty(map).context("Failed to serialize credential store")?;

        match fs::remove_file(&temp_file).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                return Err(err).context("Failed to remove stale temp credential store");
            }
            _ => {}
        }

        let mut file = owner_only()
            .open(&temp_file)
            .await
            .context("Failed to create temp credential store")?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to write temp credential store")?;
        file.sync_all()
            .await
            .context("Failed to flush temp credential store")?;
        drop(file);

        fs::rename(&temp_file, &self.path)
            .await
            .context("Failed to rename credential store")?;

        debug!("Credential store written to {:?}", self.path);
        Ok(())
    }
}

/// Options for a fresh file only the owner can read.
fn owner_only() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    options
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.read_map().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map).await
    }
}
