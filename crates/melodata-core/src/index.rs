// crates/melodata-core/src/index.rs
// ============================================================================
// Module: Track Index
// Description: Embedded per-dataset index of track files and checksums.
// Purpose: Single source of truth for track_ids, load, and validate.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each dataset module embeds a JSON index mapping track id → file key →
//! `{path, checksum}`. `track_ids()` enumerates the index keys, `load()`
//! constructs one Track per key, and `validate()` compares local files
//! against the indexed checksums. Iteration order is sorted by track id;
//! ordering is not part of the contract, only uniqueness and completeness.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::DatasetError;
use crate::identifiers::TrackId;

// ============================================================================
// SECTION: Index Types
// ============================================================================

/// One indexed file belonging to a track.
///
/// # Invariants
/// - `path` is relative to the dataset's data-home.
/// - `checksum`, when present, is the lowercase hex SHA-256 of the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    /// Data-home-relative file path.
    pub path: String,
    /// Expected SHA-256 checksum, when recorded.
    pub checksum: Option<String>,
}

/// Parsed dataset index.
///
/// # Invariants
/// - Track ids are validated [`TrackId`]s, unique by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackIndex {
    /// File entries per track, keyed by validated track id.
    tracks: BTreeMap<TrackId, BTreeMap<String, IndexEntry>>,
}

impl TrackIndex {
    /// Parses an embedded JSON index.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Index`] on malformed JSON or
    /// [`DatasetError::InvalidTrackId`] on a malformed indexed id.
    pub fn parse(raw: &str) -> Result<Self, DatasetError> {
        let parsed: BTreeMap<String, BTreeMap<String, IndexEntry>> = serde_json::from_str(raw)
            .map_err(|err| DatasetError::Index(format!("malformed index json: {err}")))?;
        let mut tracks = BTreeMap::new();
        for (raw_id, files) in parsed {
            let id = TrackId::parse(&raw_id)?;
            tracks.insert(id, files);
        }
        Ok(Self { tracks })
    }

    /// Returns the indexed track ids in sorted order.
    #[must_use]
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.tracks.keys().cloned().collect()
    }

    /// Returns true when the id is indexed.
    #[must_use]
    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.contains_key(id)
    }

    /// Returns the file entries for one track.
    #[must_use]
    pub fn files(&self, id: &TrackId) -> Option<&BTreeMap<String, IndexEntry>> {
        self.tracks.get(id)
    }

    /// Iterates tracks in sorted id order.
    pub fn iter(&self) -> impl Iterator<Item = (&TrackId, &BTreeMap<String, IndexEntry>)> {
        self.tracks.iter()
    }

    /// Returns the number of indexed tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns true when the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::*;

    const SAMPLE: &str = r#"{
        "track_b": {
            "audio": {"path": "audio/track_b.wav", "checksum": "ab"}
        },
        "track_a": {
            "melody": {"path": "melody/track_a.csv", "checksum": null}
        }
    }"#;

    #[test]
    fn parses_and_sorts_track_ids() {
        let index = TrackIndex::parse(SAMPLE).unwrap();
        assert_eq!(index.len(), 2);
        let ids: Vec<String> =
            index.track_ids().into_iter().map(|id| id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["track_a", "track_b"]);
        let id = TrackId::parse("track_b").unwrap();
        let files = index.files(&id).unwrap();
        assert_eq!(files["audio"].path, "audio/track_b.wav");
        assert_eq!(files["audio"].checksum.as_deref(), Some("ab"));
    }

    #[test]
    fn rejects_malformed_json_and_ids() {
        assert!(matches!(TrackIndex::parse("not json"), Err(DatasetError::Index(_))));
        let bad_id = r#"{"bad id!": {}}"#;
        assert!(matches!(
            TrackIndex::parse(bad_id),
            Err(DatasetError::InvalidTrackId { .. })
        ));
    }
}
