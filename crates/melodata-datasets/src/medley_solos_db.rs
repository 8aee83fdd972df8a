// crates/melodata-datasets/src/medley_solos_db.rs
// ============================================================================
// Module: Medley-solos-DB Dataset
// Description: Medley-solos-DB instrument-classification dataset module.
// Purpose: Expose clip metadata and audio paths behind the uniform surface.
// Dependencies: melodata-core, melodata-download, csv, serde, crate::support
// ============================================================================

//! ## Overview
//! Medley-solos-DB is a collection of fixed-length solo instrument clips for
//! instrument classification. Each clip is identified by a UUID and described
//! by one row of a shared metadata CSV (split subset and instrument label);
//! the audio itself is obtained separately. The module declares the metadata
//! CSV as its single plain remote, so its download surface accepts only
//! `force_overwrite` beyond `data_home`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use melodata_core::DatasetError;
use melodata_core::DatasetModule;
use melodata_core::DownloadError;
use melodata_core::DownloadOptions;
use melodata_core::DownloadSurface;
use melodata_core::IndexEntry;
use melodata_core::JamsDocument;
use melodata_core::LoaderArgs;
use melodata_core::LoaderSpec;
use melodata_core::RemoteCardinality;
use melodata_core::RemoteFetcher;
use melodata_core::RemoteFile;
use melodata_core::RemoteKey;
use melodata_core::RemoteSet;
use melodata_core::Track;
use melodata_core::TrackId;
use melodata_core::TrackIndex;
use melodata_core::ValidationReport;
use melodata_core::ValidationReporting;
use melodata_core::resolve_data_home;
use melodata_download::Downloader;
use melodata_download::validate_index;
use serde::Deserialize;

use crate::support;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory name under the data-home root.
const DATASET_DIR: &str = "Medley-solos-DB";

/// Every clip in the collection is exactly this long, in seconds.
const CLIP_DURATION: f64 = 2.972;

/// BibTeX citation for the dataset.
const CITATION: &str = r"@article{lostanlen2018extended,
  title={Extended playing techniques: the next milestone in musical
         instrument recognition},
  author={Lostanlen, Vincent and And{\'e}n, Joakim and Lagrange, Mathieu},
  journal={Proceedings of the 5th International Conference on Digital
           Libraries for Musicology (DLfM)},
  year={2018}
}";

/// Embedded track index.
const INDEX_JSON: &str = include_str!("../indexes/medley_solos_db_index.json");

/// Lazily parsed index cell.
static INDEX: OnceLock<TrackIndex> = OnceLock::new();

/// Lazily built remote set cell.
static REMOTES: OnceLock<RemoteSet> = OnceLock::new();

/// Returns the declared remote files.
fn remotes() -> &'static RemoteSet {
    REMOTES.get_or_init(|| {
        RemoteSet::from_entries([(
            RemoteKey::new("metadata"),
            RemoteFile::new(
                "Medley-solos-DB_metadata.csv",
                "https://zenodo.org/record/2582103/files/Medley-solos-DB_metadata.csv",
                "9a8e0e9b53a5b2ff92913c61154aa5e1d6f0a9c9b0c3b7fbc3e979e257e3f4d1",
            ),
        )])
    })
}

// ============================================================================
// SECTION: Loaders
// ============================================================================

/// One row of the shared metadata CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClipMetadata {
    /// Split subset the clip belongs to (`training`, `validation`, `test`).
    pub subset: String,
    /// Instrument label.
    pub instrument: String,
    /// Clip UUID; doubles as the track id.
    pub uuid4: String,
}

/// Loads the shared metadata CSV.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path and
/// [`DatasetError::Parse`] for malformed rows.
pub fn load_metadata(path: &Path) -> Result<Vec<ClipMetadata>, DatasetError> {
    support::require_file(path)?;
    let mut reader = csv::Reader::from_path(path).map_err(|err| DatasetError::Parse {
        path: path.to_path_buf(),
        reason: format!("unreadable metadata csv: {err}"),
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<ClipMetadata>() {
        rows.push(record.map_err(|err| DatasetError::Parse {
            path: path.to_path_buf(),
            reason: format!("malformed metadata row: {err}"),
        })?);
    }
    Ok(rows)
}

/// Probe adapter for [`load_metadata`].
fn probe_metadata(path: &Path, _args: &LoaderArgs) -> Result<(), DatasetError> {
    load_metadata(path).map(drop)
}

// ============================================================================
// SECTION: Track
// ============================================================================

/// One Medley-solos-DB clip with its metadata row.
#[derive(Debug)]
pub struct MedleySolosDbTrack {
    /// Validated track id (the clip UUID).
    track_id: TrackId,
    /// Data-home the track was bound to.
    data_home: PathBuf,
    /// Indexed audio file path.
    audio_path: PathBuf,
    /// Indexed shared metadata CSV path.
    metadata_path: PathBuf,
    /// Lazily loaded metadata row for this clip.
    metadata: OnceCell<ClipMetadata>,
}

impl MedleySolosDbTrack {
    /// Binds a track to its indexed files without touching the filesystem.
    fn from_index(
        track_id: TrackId,
        data_home: PathBuf,
        files: &BTreeMap<String, IndexEntry>,
    ) -> Result<Self, DatasetError> {
        let audio_path = support::indexed_path(&data_home, files, "audio", &track_id)?;
        let metadata_path = support::indexed_path(&data_home, files, "metadata", &track_id)?;
        Ok(Self {
            track_id,
            data_home,
            audio_path,
            metadata_path,
            metadata: OnceCell::new(),
        })
    }

    /// Returns the indexed audio file path.
    #[must_use]
    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    /// Returns this clip's metadata row, loading the CSV on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] when the CSV is absent and
    /// [`DatasetError::Parse`] when it is malformed or lacks a row for this
    /// clip.
    pub fn metadata(&self) -> Result<&ClipMetadata, DatasetError> {
        if let Some(metadata) = self.metadata.get() {
            return Ok(metadata);
        }
        let rows = load_metadata(&self.metadata_path)?;
        let row = rows
            .into_iter()
            .find(|row| row.uuid4 == self.track_id.as_str())
            .ok_or_else(|| DatasetError::Parse {
                path: self.metadata_path.clone(),
                reason: format!("no metadata row for clip `{}`", self.track_id),
            })?;
        Ok(self.metadata.get_or_init(|| row))
    }

    /// Returns the instrument label of the clip.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the metadata CSV is absent or malformed.
    pub fn instrument(&self) -> Result<&str, DatasetError> {
        Ok(&self.metadata()?.instrument)
    }

    /// Returns the split subset of the clip.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the metadata CSV is absent or malformed.
    pub fn subset(&self) -> Result<&str, DatasetError> {
        Ok(&self.metadata()?.subset)
    }
}

impl fmt::Display for MedleySolosDbTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "medley_solos_db track {}", self.track_id)
    }
}

impl Track for MedleySolosDbTrack {
    fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    fn data_home(&self) -> &Path {
        &self.data_home
    }

    fn to_jams(&self) -> Result<JamsDocument, DatasetError> {
        let metadata = self.metadata()?;
        let mut doc = JamsDocument::new(CLIP_DURATION)?;
        doc.set_title(self.track_id.as_str());
        doc.push_tag(&metadata.instrument);
        Ok(doc)
    }
}

// ============================================================================
// SECTION: Dataset Module
// ============================================================================

/// The Medley-solos-DB dataset module.
#[derive(Debug, Clone, Copy)]
pub struct MedleySolosDb {
    /// Parsed embedded index.
    index: &'static TrackIndex,
}

impl MedleySolosDb {
    /// Creates the module, parsing the embedded index on first construction.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Index`] when the embedded index is malformed.
    pub fn new() -> Result<Self, DatasetError> {
        Ok(Self {
            index: support::index_from(&INDEX, INDEX_JSON)?,
        })
    }
}

impl DatasetModule for MedleySolosDb {
    fn name(&self) -> &'static str {
        "medley_solos_db"
    }

    fn dataset_dir(&self) -> &'static str {
        DATASET_DIR
    }

    fn cite(&self) -> &'static str {
        CITATION
    }

    fn remotes(&self) -> Option<&RemoteSet> {
        Some(remotes())
    }

    fn download_surface(&self) -> DownloadSurface {
        DownloadSurface {
            cardinality: RemoteCardinality::Single,
            has_archive: false,
        }
    }

    fn download(
        &self,
        options: &DownloadOptions,
        fetcher: &dyn RemoteFetcher,
    ) -> Result<(), DownloadError> {
        Downloader::new(fetcher).run(DATASET_DIR, self.remotes(), options)
    }

    fn validate(
        &self,
        data_home: Option<&Path>,
        reporting: ValidationReporting<'_>,
    ) -> Result<ValidationReport, DatasetError> {
        validate_index(self.index, &resolve_data_home(data_home, DATASET_DIR), reporting)
    }

    fn track_ids(&self) -> Vec<TrackId> {
        self.index.track_ids()
    }

    fn load(
        &self,
        data_home: Option<&Path>,
    ) -> Result<BTreeMap<TrackId, Box<dyn Track>>, DatasetError> {
        let home = resolve_data_home(data_home, DATASET_DIR);
        let mut tracks: BTreeMap<TrackId, Box<dyn Track>> = BTreeMap::new();
        for (id, files) in self.index.iter() {
            let track = MedleySolosDbTrack::from_index(id.clone(), home.clone(), files)?;
            tracks.insert(id.clone(), Box::new(track));
        }
        Ok(tracks)
    }

    fn track(
        &self,
        track_id: &str,
        data_home: Option<&Path>,
    ) -> Result<Box<dyn Track>, DatasetError> {
        let (id, files) = support::lookup_track(self.index, track_id)?;
        let home = resolve_data_home(data_home, DATASET_DIR);
        Ok(Box::new(MedleySolosDbTrack::from_index(id, home, files)?))
    }

    fn loaders(&self) -> Vec<LoaderSpec> {
        vec![LoaderSpec::new("load_metadata", &[], probe_metadata)]
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

    use std::fs;

    use super::*;

    /// Header plus two metadata rows.
    const SAMPLE: &str = "subset,instrument,uuid4\n\
        validation,flute,d07b1fc0-567d-52c2-fef4-239f31c9d40e\n\
        training,clarinet,0a282672-c22c-50a6-92f5-b7d159e0cdb0\n";

    #[test]
    fn load_metadata_parses_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, SAMPLE).unwrap();
        let rows = load_metadata(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].instrument, "flute");
        assert_eq!(rows[1].subset, "training");
    }

    #[test]
    fn load_metadata_rejects_fake_path_with_io() {
        let err = load_metadata(Path::new("a/fake/filepath")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn track_resolves_its_metadata_row() {
        let module = MedleySolosDb::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("annotation")).unwrap();
        fs::write(dir.path().join("annotation/Medley-solos-DB_metadata.csv"), SAMPLE).unwrap();
        let track = module
            .track("d07b1fc0-567d-52c2-fef4-239f31c9d40e", Some(dir.path()))
            .unwrap();
        let jams = track.to_jams().unwrap();
        jams.validate_schema().unwrap();
    }

    #[test]
    fn unknown_and_malformed_ids_are_rejected() {
        let module = MedleySolosDb::new().unwrap();
        assert!(module.track("~faketrackid~?!", None).unwrap_err().is_invalid_track_id());
        assert!(module
            .track("ffffffff-0000-0000-0000-000000000000", None)
            .unwrap_err()
            .is_invalid_track_id());
    }

    #[test]
    fn declared_surface_matches_derived_surface() {
        let module = MedleySolosDb::new().unwrap();
        let surface = module.download_surface();
        assert_eq!(surface, DownloadSurface::for_remotes(module.remotes()));
        assert!(surface.accepts_force_overwrite());
        assert!(!surface.accepts_partial_download());
        assert!(!surface.accepts_cleanup());
    }
}
