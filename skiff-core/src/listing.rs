//! Listing generation for directories and the shared-item set.
//!
//! Produces the uniform wire-visible metadata records the browser page
//! consumes. Ordering is enumeration order; sorting and filtering are a
//! client responsibility.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::share::{ContentSource, shared_item_id};

/// One wire-visible listing record.
///
/// `path` is relative to whichever root is in effect, '/'-separated, no
/// leading slash, and resolves back to the same content when used as a
/// sub-path or download identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    /// Bytes; 0 for shared items, whose size is not reliably known.
    pub size: u64,
    /// Unix seconds; the current time for shared items.
    pub last_modified: f64,
}

/// Enumerates the shared-item set.
///
/// Handles expose no reliable metadata, so entries report zero size and
/// the current time, and are addressed by ordinal identifier.
pub fn list_shared(shared: &[Arc<dyn ContentSource>]) -> Vec<FileEntry> {
    let now = unix_seconds(SystemTime::now());
    shared
        .iter()
        .enumerate()
        .map(|(index, source)| FileEntry {
            name: source.display_name(),
            path: shared_item_id(index),
            is_dir: false,
            size: 0,
            last_modified: now,
        })
        .collect()
}

/// Enumerates the direct children of `dir`.
///
/// `sub_path` is the request-relative prefix entry paths are built from.
/// A missing or non-directory target yields an empty listing, never an
/// error. Entries with an empty name are skipped; hidden files are
/// intentionally not filtered.
pub async fn list_directory(dir: &Path, sub_path: &str) -> Vec<FileEntry> {
    let mut entries = Vec::new();

    let Ok(mut read_dir) = tokio::fs::read_dir(dir).await else {
        return entries;
    };

    while let Ok(Some(entry)) = read_dir.next_entry().await {
        if entry.file_name().is_empty() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        let Ok(metadata) = entry.metadata().await else {
            continue;
        };

        let path = if sub_path.is_empty() {
            name.clone()
        } else {
            format!("{sub_path}/{name}")
        };

        entries.push(FileEntry {
            name,
            path,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            last_modified: metadata
                .modified()
                .map(unix_seconds)
                .unwrap_or(0.0),
        });
    }

    entries
}

fn unix_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
