// crates/melodata-datasets/src/medleydb_melody.rs
// ============================================================================
// Module: MedleyDB Melody Dataset
// Description: MedleyDB melody-subset dataset module.
// Purpose: Expose MedleyDB melody annotations behind the uniform surface.
// Dependencies: melodata-core, crate::support
// ============================================================================

//! ## Overview
//! The MedleyDB melody subset is distributed under a custom license that
//! forbids redirection: the module declares no remotes and its download
//! surface is the bare `data_home`-only form. Melody files are
//! comma-separated `time,frequency` rows where frequency 0 marks unvoiced
//! frames.

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
use melodata_core::F0Data;
use melodata_core::IndexEntry;
use melodata_core::JamsDocument;
use melodata_core::LoaderArgs;
use melodata_core::LoaderSpec;
use melodata_core::RemoteCardinality;
use melodata_core::RemoteFetcher;
use melodata_core::RemoteSet;
use melodata_core::Track;
use melodata_core::TrackId;
use melodata_core::TrackIndex;
use melodata_core::ValidationReport;
use melodata_core::ValidationReporting;
use melodata_core::resolve_data_home;
use melodata_download::Downloader;
use melodata_download::validate_index;

use crate::support;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory name under the data-home root.
const DATASET_DIR: &str = "MedleyDB-Melody";

/// BibTeX citation for the dataset.
const CITATION: &str = r"@inproceedings{bittner2014medleydb,
  title={Med{l}ey{DB}: A multitrack dataset for annotation-intensive {MIR}
         research},
  author={Bittner, Rachel M. and Salamon, Justin and Tierney, Mike and
          Mauch, Matthias and Cannam, Chris and Bello, Juan P.},
  booktitle={Proceedings of the 15th International Society for Music
             Information Retrieval Conference (ISMIR)},
  year={2014}
}";

/// Embedded track index.
const INDEX_JSON: &str = include_str!("../indexes/medleydb_melody_index.json");

/// Lazily parsed index cell.
static INDEX: OnceLock<TrackIndex> = OnceLock::new();

// ============================================================================
// SECTION: Loaders
// ============================================================================

/// Loads a MedleyDB melody file: comma-separated `time,frequency` rows.
///
/// Frequency 0 marks unvoiced frames; confidence is 1 for voiced frames and
/// 0 otherwise.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path, [`DatasetError::Parse`]
/// for malformed rows, and [`DatasetError::Annotation`] for invalid values.
pub fn load_melody(path: &Path) -> Result<F0Data, DatasetError> {
    let raw = support::read_annotation(path)?;
    let mut times = Vec::new();
    let mut frequencies = Vec::new();
    let mut confidence = Vec::new();
    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        let mut fields = line.split(',');
        let (Some(time), Some(frequency)) = (fields.next(), fields.next()) else {
            return Err(DatasetError::Parse {
                path: path.to_path_buf(),
                reason: format!("expected `time,frequency`, found `{line}`"),
            });
        };
        let frequency = support::parse_f64(frequency, path)?;
        times.push(support::parse_f64(time, path)?);
        confidence.push(if frequency > 0.0 { 1.0 } else { 0.0 });
        frequencies.push(frequency);
    }
    F0Data::new(times, frequencies, confidence).map_err(|err| support::annotation_error(path, err))
}

/// Probe adapter for [`load_melody`].
fn probe_melody(path: &Path, _args: &LoaderArgs) -> Result<(), DatasetError> {
    load_melody(path).map(drop)
}

// ============================================================================
// SECTION: Track
// ============================================================================

/// One MedleyDB multitrack with its melody annotation.
#[derive(Debug)]
pub struct MedleydbMelodyTrack {
    /// Validated track id.
    track_id: TrackId,
    /// Data-home the track was bound to.
    data_home: PathBuf,
    /// Indexed melody file path.
    melody1_path: PathBuf,
    /// Lazily parsed melody annotation.
    melody1: OnceCell<F0Data>,
}

impl MedleydbMelodyTrack {
    /// Binds a track to its indexed files without touching the filesystem.
    fn from_index(
        track_id: TrackId,
        data_home: PathBuf,
        files: &BTreeMap<String, IndexEntry>,
    ) -> Result<Self, DatasetError> {
        let melody1_path = support::indexed_path(&data_home, files, "melody1", &track_id)?;
        Ok(Self {
            track_id,
            data_home,
            melody1_path,
            melody1: OnceCell::new(),
        })
    }

    /// Returns the indexed melody file path.
    #[must_use]
    pub fn melody1_path(&self) -> &Path {
        &self.melody1_path
    }

    /// Returns the melody annotation, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the melody file is absent or malformed.
    pub fn melody1(&self) -> Result<&F0Data, DatasetError> {
        if let Some(melody) = self.melody1.get() {
            return Ok(melody);
        }
        let parsed = load_melody(&self.melody1_path)?;
        Ok(self.melody1.get_or_init(|| parsed))
    }
}

impl fmt::Display for MedleydbMelodyTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "medleydb_melody track {}", self.track_id)
    }
}

impl Track for MedleydbMelodyTrack {
    fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    fn data_home(&self) -> &Path {
        &self.data_home
    }

    fn to_jams(&self) -> Result<JamsDocument, DatasetError> {
        let melody = self.melody1()?;
        let duration = melody.times.last().copied().unwrap_or(0.0);
        let mut doc = JamsDocument::new(duration)?;
        doc.set_title(self.track_id.as_str());
        doc.push_f0(melody);
        Ok(doc)
    }
}

// ============================================================================
// SECTION: Dataset Module
// ============================================================================

/// The MedleyDB melody-subset dataset module.
#[derive(Debug, Clone, Copy)]
pub struct MedleydbMelody {
    /// Parsed embedded index.
    index: &'static TrackIndex,
}

impl MedleydbMelody {
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

impl DatasetModule for MedleydbMelody {
    fn name(&self) -> &'static str {
        "medleydb_melody"
    }

    fn dataset_dir(&self) -> &'static str {
        DATASET_DIR
    }

    fn cite(&self) -> &'static str {
        CITATION
    }

    fn remotes(&self) -> Option<&RemoteSet> {
        None
    }

    fn download_surface(&self) -> DownloadSurface {
        DownloadSurface {
            cardinality: RemoteCardinality::None,
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
            let track = MedleydbMelodyTrack::from_index(id.clone(), home.clone(), files)?;
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
        Ok(Box::new(MedleydbMelodyTrack::from_index(id, home, files)?))
    }

    fn loaders(&self) -> Vec<LoaderSpec> {
        vec![LoaderSpec::new("load_melody", &[], probe_melody)]
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

    #[test]
    fn load_melody_parses_comma_separated_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("melody1.csv");
        fs::write(&path, "0.000000,0.000\n0.005805,196.000\n0.011610,196.434\n").unwrap();
        let melody = load_melody(&path).unwrap();
        assert_eq!(melody.times.len(), 3);
        assert_eq!(melody.confidence, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn load_melody_rejects_fake_path_with_io() {
        let err = load_melody(Path::new("a/fake/filepath")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn module_declares_no_remotes() {
        let module = MedleydbMelody::new().unwrap();
        assert!(module.remotes().is_none());
        assert_eq!(
            module.download_surface(),
            DownloadSurface::for_remotes(None)
        );
    }

    #[test]
    fn download_without_remotes_succeeds_and_rejects_extras() {
        let module = MedleydbMelody::new().unwrap();
        let fetcher = melodata_download::NullFetcher;
        module.download(&DownloadOptions::default(), &fetcher).unwrap();
        let forced = DownloadOptions {
            force_overwrite: true,
            ..DownloadOptions::default()
        };
        let err = module.download(&forced, &fetcher).unwrap_err();
        assert!(matches!(err, DownloadError::OptionNotAccepted { .. }));
    }

    #[test]
    fn track_ids_match_load_keys() {
        let module = MedleydbMelody::new().unwrap();
        let ids = module.track_ids();
        let loaded = module.load(None).unwrap();
        assert_eq!(ids.len(), loaded.len());
        assert!(ids.iter().all(|id| loaded.contains_key(id)));
    }
}
