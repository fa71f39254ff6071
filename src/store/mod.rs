//! File-backed store: reads, writes, merge and change-classification.

pub mod dayfile;
pub mod locks;
pub mod merge;
pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use dayfile::{DayFile, SaveDecision, Sample};

use crate::prev_close::PrevCloseSource;
use crate::symbol::{MarketKind, Symbol};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("file system error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode day file at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode day file: {0}")]
    Encode(#[source] serde_json::Error),
}

pub struct Store {
    root: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn with_default_root() -> Self {
        Self::new(paths::data_root())
    }

    /// Reads the day file for `(symbol, date)`, trying the partitioned
    /// layout first and falling back to the legacy flat layout (read-only).
    /// A missing file is `Ok(None)`, not an error.
    pub async fn read(
        &self,
        market: MarketKind,
        symbol: &Symbol,
        date: &str,
    ) -> Result<Option<DayFile>, StoreError> {
        let path = paths::resolve_for_read(&self.root, market, symbol, date);
        self.read_path(&path).await
    }

    async fn read_path(&self, path: &Path) -> Result<Option<DayFile>, StoreError> {
        let lock = locks::FILE_LOCKS.mutex_for(path);
        let _guard = lock.lock().await;
        self.read_path_locked(path).await
    }

    async fn read_path_locked(&self, path: &Path) -> Result<Option<DayFile>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let file = serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Some(file))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// One fetch-merge-save cycle's Store half: loads the existing file
    /// (partitioned, falling back to legacy), classifies `fresh` against it,
    /// and — unless the decision is `Skip` — atomically writes the merged
    /// result to the partitioned path. Always returns the decision, and the
    /// merged samples actually on disk after the call.
    pub async fn merge_and_save(
        &self,
        market: MarketKind,
        symbol: &Symbol,
        name: &str,
        date: &str,
        fresh: &[Sample],
    ) -> Result<(SaveDecision, Vec<Sample>), StoreError> {
        let read_path = paths::resolve_for_read(&self.root, market, symbol, date);
        let write_path = paths::resolve_for_write(&self.root, market, symbol, date);

        let lock = locks::FILE_LOCKS.mutex_for(&write_path);
        let _guard = lock.lock().await;

        let existing_file = self.read_path_locked(&read_path).await?;
        let existing_samples: Vec<Sample> = existing_file
            .as_ref()
            .map(|f| f.datapoints.clone())
            .unwrap_or_default();

        let decision = merge::classify(&existing_samples, fresh);

        if decision == SaveDecision::Skip {
            return Ok((decision, existing_samples));
        }

        let merged = merge::merge(&existing_samples, fresh);
        let mut file = DayFile {
            code: symbol.as_str().to_string(),
            name: name.to_string(),
            date: date.to_string(),
            market: market.code().to_string(),
            datapoints: merged.clone(),
            updated_at: now_local_string(),
            prev_close: existing_file.and_then(|f| f.prev_close),
        };
        self.write_locked(&write_path, &mut file).await?;

        Ok((decision, merged))
    }

    /// Opportunistically fills a missing `prev_close` from `source` and
    /// writes it back. Best-effort: all errors are logged and swallowed,
    /// never blocks the caller on it.
    pub async fn backfill_prev_close(
        &self,
        market: MarketKind,
        symbol: &Symbol,
        date: &str,
        source: &(dyn PrevCloseSource),
    ) {
        let read_path = paths::resolve_for_read(&self.root, market, symbol, date);
        let write_path = paths::resolve_for_write(&self.root, market, symbol, date);

        let lock = locks::FILE_LOCKS.mutex_for(&write_path);
        let _guard = lock.lock().await;

        let Ok(Some(mut file)) = self.read_path_locked(&read_path).await else {
            return;
        };
        if file.prev_close.is_some() {
            return;
        }
        let Some(price) = source.prev_close(symbol) else {
            return;
        };
        file.prev_close = Some(price);
        file.updated_at = now_local_string();

        if let Err(err) = self.write_locked(&write_path, &mut file).await {
            tracing::warn!(symbol = %symbol, error = %err, "prev_close backfill write failed, ignoring");
        }
    }

    async fn write_locked(&self, path: &Path, file: &mut DayFile) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let encoded = serde_json::to_vec_pretty(file).map_err(StoreError::Encode)?;
        let tmp_path = path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, &encoded)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }
}

fn now_local_string() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
