//! Routing table cache persistence.
//!
//! Compilation runs once per process lifetime; the serialized table lets
//! subsequent starts skip it entirely. The artifact is pure data (pattern
//! strings and candidate lists), and a loaded table matches bit-identically
//! to the one that was saved.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use thiserror::Error;

use crate::routing::error::CompileError;
use crate::routing::table::{RoutingTable, TableData};

/// Error type for cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cached pattern strings no longer compile, e.g. a corrupt or
    /// hand-edited artifact.
    #[error("Rebuild error: {0}")]
    Rebuild(#[from] CompileError),
}

/// Persist the table's pure-data form as JSON.
pub fn save_table(table: &RoutingTable, path: &Path) -> Result<(), CacheError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), table.data())?;
    Ok(())
}

/// Load a previously saved table and rebuild its compiled state.
pub fn load_table(path: &Path) -> Result<RoutingTable, CacheError> {
    let file = fs::File::open(path)?;
    let data: TableData = serde_json::from_reader(BufReader::new(file))?;
    let table = RoutingTable::from_data(data)?;

    tracing::info!(
        cache = %path.display(),
        chunks = table.data().chunks.len(),
        "route table loaded from cache"
    );

    Ok(table)
}
