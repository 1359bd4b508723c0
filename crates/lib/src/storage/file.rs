//! File-backed session store: one JSON file per slot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{errors::StorageError, store::SessionStore};
use crate::Result;

/// A [`SessionStore`] that keeps each slot in `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file which is synced and then renamed
/// over the slot, so a crash mid-write leaves either the old or the new
/// contents, never a torn file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a slot.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            }
            .into());
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e).into()),
        };
        // Bytes that are not text can never decode into a snapshot
        String::from_utf8(bytes).map(Some).map_err(|e| {
            crate::Error::from(StorageError::Corrupt {
                reason: format!("slot '{key}' is not valid UTF-8: {e}"),
            })
        })
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| io_error(key, e))?;
        file.write_all(value.as_bytes())
            .await
            .map_err(|e| io_error(key, e))?;
        file.sync_all().await.map_err(|e| io_error(key, e))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| io_error(key, e))?;

        tracing::trace!(path = %path.display(), "wrote session slot");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e).into()),
        }
    }
}
