//! # Dataset Cache Module
//!
//! Process-wide cache of loaded transaction files
//!
//! ## Key Components
//! - [`DatasetCache`] - Cache keyed by path, invalidated when the file changes
//! - [`load_dataset`] - Load through the process-wide cache

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::errors::LoadError;
use crate::loader::read_transactions_file;
use crate::models::TransactionRecord;

lazy_static::lazy_static! {
    static ref DATASET_CACHE: DatasetCache = DatasetCache::new();
}

/// What identifies a version of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceIdentity {
    modified: SystemTime,
    len: u64,
}

#[derive(Debug)]
struct CachedDataset {
    identity: SourceIdentity,
    records: Arc<Vec<TransactionRecord>>,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, CachedDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cleaned records for `path`, reloading when the file's
    /// modification time or length no longer match the cached entry.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Vec<TransactionRecord>>, LoadError> {
        let identity = source_identity(path)?;
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(cached) = entries.get(path) {
            if cached.identity == identity {
                debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&cached.records));
            }
            debug!("{} changed on disk, reloading", path.display());
        } else {
            debug!("Dataset cache miss for {}", path.display());
        }

        let records = Arc::new(read_transactions_file(path)?);
        entries.insert(
            path.to_path_buf(),
            CachedDataset {
                identity,
                records: Arc::clone(&records),
            },
        );

        Ok(records)
    }
}

fn source_identity(path: &Path) -> Result<SourceIdentity, LoadError> {
    let io_error = |source: std::io::Error| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(io_error)?;
    let modified = metadata.modified().map_err(io_error)?;

    Ok(SourceIdentity {
        modified,
        len: metadata.len(),
    })
}

/// Load a transactions file through the process-wide cache
pub fn load_dataset(path: &Path) -> Result<Arc<Vec<TransactionRecord>>, LoadError> {
    DATASET_CACHE.get_or_load(path)
}
