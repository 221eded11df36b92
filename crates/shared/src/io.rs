use chrono::DateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MalformedStoreError, PersistError};
use crate::models::{CollectionSnapshot, SummaryRecord};

pub const DEFAULT_SNAPSHOT_FILE: &str = "collected.json";
pub const DEFAULT_SUMMARY_FILE: &str = "last_summary.json";

/// Write the collection snapshot, replacing whatever was there.
pub fn save_snapshot(snapshot: &CollectionSnapshot, path: &Path) -> Result<PathBuf, PersistError> {
    write_json(snapshot, "collection snapshot", path)
}

/// Write the audit record of a summarize run.
pub fn save_summary_record(record: &SummaryRecord, path: &Path) -> Result<PathBuf, PersistError> {
    write_json(record, "summary record", path)
}

fn write_json<T: Serialize>(
    value: &T,
    what: &'static str,
    path: &Path,
) -> Result<PathBuf, PersistError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| PersistError::Serialize { what, source })?;

    fs::write(path, json).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(path.to_path_buf())
}

/// Load a snapshot written by the collect phase.
///
/// A file without `items` is an error, never an empty collection.
pub fn load_snapshot(path: &Path) -> Result<CollectionSnapshot, MalformedStoreError> {
    let content = fs::read_to_string(path).map_err(|source| MalformedStoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let snapshot: CollectionSnapshot =
        serde_json::from_str(&content).map_err(|source| MalformedStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if DateTime::parse_from_rfc3339(&snapshot.collected_at).is_err() {
        return Err(MalformedStoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: snapshot.collected_at,
        });
    }

    Ok(snapshot)
}
