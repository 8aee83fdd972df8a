// crates/melodata-datasets/src/support.rs
// ============================================================================
// Module: Dataset Support Helpers
// Description: Shared index, file, and parse plumbing for dataset modules.
// Purpose: Keep per-dataset modules focused on their annotation formats.
// Dependencies: melodata-core
// ============================================================================

//! ## Overview
//! Every dataset module does the same bookkeeping around its format-specific
//! parsing: lazily parse the embedded index once, resolve indexed paths for a
//! track, check file existence before reading, and wrap parse failures with
//! file context. Those steps live here so the modules stay one screen of
//! format logic each.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use melodata_core::DatasetError;
use melodata_core::IndexEntry;
use melodata_core::TrackId;
use melodata_core::TrackIndex;

// ============================================================================
// SECTION: Index Access
// ============================================================================

/// Parses an embedded index once, caching it in the module's static cell.
///
/// # Errors
///
/// Returns [`DatasetError::Index`] when the embedded JSON is malformed.
pub(crate) fn index_from(
    cell: &'static OnceLock<TrackIndex>,
    raw: &'static str,
) -> Result<&'static TrackIndex, DatasetError> {
    if let Some(index) = cell.get() {
        return Ok(index);
    }
    let parsed = TrackIndex::parse(raw)?;
    Ok(cell.get_or_init(|| parsed))
}

/// Looks up the file entries for a caller-supplied track id.
///
/// # Errors
///
/// Returns [`DatasetError::InvalidTrackId`] when the id is malformed or not
/// present in the index.
pub(crate) fn lookup_track<'i>(
    index: &'i TrackIndex,
    raw_id: &str,
) -> Result<(TrackId, &'i BTreeMap<String, IndexEntry>), DatasetError> {
    let id = TrackId::parse(raw_id)?;
    let files = index.files(&id).ok_or_else(|| DatasetError::InvalidTrackId {
        track_id: raw_id.to_string(),
        reason: "track id not present in the dataset index".to_string(),
    })?;
    Ok((id, files))
}

/// Resolves one indexed file key to an absolute path under the data-home.
///
/// # Errors
///
/// Returns [`DatasetError::Index`] when the track has no entry for the key.
pub(crate) fn indexed_path(
    data_home: &Path,
    files: &BTreeMap<String, IndexEntry>,
    key: &str,
    track_id: &TrackId,
) -> Result<PathBuf, DatasetError> {
    files
        .get(key)
        .map(|entry| data_home.join(&entry.path))
        .ok_or_else(|| DatasetError::Index(format!("track `{track_id}` has no `{key}` entry")))
}

// ============================================================================
// SECTION: File Access
// ============================================================================

/// Rejects nonexistent paths with the standard missing-file error.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] when the path is not an existing file.
pub(crate) fn require_file(path: &Path) -> Result<(), DatasetError> {
    if path.is_file() {
        return Ok(());
    }
    Err(DatasetError::missing_file(path.to_path_buf()))
}

/// Reads an annotation file to a string, checking existence first.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] when the file is absent or unreadable.
pub(crate) fn read_annotation(path: &Path) -> Result<String, DatasetError> {
    require_file(path)?;
    fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// SECTION: Parse Helpers
// ============================================================================

/// Parses one floating-point field, attaching file context on failure.
///
/// # Errors
///
/// Returns [`DatasetError::Parse`] when the field is not a number.
pub(crate) fn parse_f64(raw: &str, path: &Path) -> Result<f64, DatasetError> {
    raw.trim().parse::<f64>().map_err(|_| DatasetError::Parse {
        path: path.to_path_buf(),
        reason: format!("expected a number, found `{raw}`"),
    })
}

/// Wraps an annotation construction error with its file path.
pub(crate) fn annotation_error(
    path: &Path,
    source: melodata_core::AnnotationError,
) -> DatasetError {
    DatasetError::Annotation {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
