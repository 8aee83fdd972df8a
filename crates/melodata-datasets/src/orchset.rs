// crates/melodata-datasets/src/orchset.rs
// ============================================================================
// Module: Orchset Dataset
// Description: Orchset symphonic melody-extraction dataset module.
// Purpose: Expose Orchset melody annotations behind the uniform surface.
// Dependencies: melodata-core, melodata-download, crate::support
// ============================================================================

//! ## Overview
//! Orchset ships 64 orchestral excerpts with a single melody (f0) annotation
//! per track, distributed as one ZIP archive. Melody files are tab-separated
//! `time<TAB>frequency` rows where frequency 0 marks unvoiced frames; voicing
//! confidence is derived from voicing (1 for voiced frames, 0 otherwise).

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

use crate::support;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory name under the data-home root.
const DATASET_DIR: &str = "Orchset";

/// BibTeX citation for the dataset.
const CITATION: &str = r"@article{bosch2016evaluation,
  title={Evaluation and combination of pitch estimation methods for melody
         extraction in symphonic classical music},
  author={Bosch, Juan J. and Marxer, Ricard and G{\'o}mez, Emilia},
  journal={Journal of New Music Research},
  volume={45},
  number={2},
  pages={101--117},
  year={2016},
  publisher={Taylor \& Francis}
}";

/// Embedded track index.
const INDEX_JSON: &str = include_str!("../indexes/orchset_index.json");

/// Lazily parsed index cell.
static INDEX: OnceLock<TrackIndex> = OnceLock::new();

/// Lazily built remote set cell.
static REMOTES: OnceLock<RemoteSet> = OnceLock::new();

/// Returns the declared remote files.
fn remotes() -> &'static RemoteSet {
    REMOTES.get_or_init(|| {
        RemoteSet::from_entries([(
            RemoteKey::new("all"),
            RemoteFile::new(
                "Orchset_dataset.zip",
                "https://zenodo.org/record/1289786/files/Orchset_dataset_0.zip",
                "c12a0c4a04b85bd926ce962a3ee0c3ec36a43b0e76b988c58302d05a2b32c219",
            ),
        )])
    })
}

// ============================================================================
// SECTION: Loaders
// ============================================================================

/// Loads an Orchset melody file: tab-separated `time<TAB>frequency` rows.
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
        let mut fields = line.split('\t');
        let (Some(time), Some(frequency)) = (fields.next(), fields.next()) else {
            return Err(DatasetError::Parse {
                path: path.to_path_buf(),
                reason: format!("expected `time<TAB>frequency`, found `{line}`"),
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

/// One Orchset excerpt with its melody annotation.
#[derive(Debug)]
pub struct OrchsetTrack {
    /// Validated track id.
    track_id: TrackId,
    /// Data-home the track was bound to.
    data_home: PathBuf,
    /// Indexed melody file path.
    melody_path: PathBuf,
    /// Lazily parsed melody annotation.
    melody: OnceCell<F0Data>,
}

impl OrchsetTrack {
    /// Binds a track to its indexed files without touching the filesystem.
    fn from_index(
        track_id: TrackId,
        data_home: PathBuf,
        files: &BTreeMap<String, IndexEntry>,
    ) -> Result<Self, DatasetError> {
        let melody_path = support::indexed_path(&data_home, files, "melody", &track_id)?;
        Ok(Self {
            track_id,
            data_home,
            melody_path,
            melody: OnceCell::new(),
        })
    }

    /// Returns the indexed melody file path.
    #[must_use]
    pub fn melody_path(&self) -> &Path {
        &self.melody_path
    }

    /// Returns the melody annotation, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the melody file is absent or malformed.
    pub fn melody(&self) -> Result<&F0Data, DatasetError> {
        if let Some(melody) = self.melody.get() {
            return Ok(melody);
        }
        let parsed = load_melody(&self.melody_path)?;
        Ok(self.melody.get_or_init(|| parsed))
    }
}

impl fmt::Display for OrchsetTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "orchset track {}", self.track_id)
    }
}

impl Track for OrchsetTrack {
    fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    fn data_home(&self) -> &Path {
        &self.data_home
    }

    fn to_jams(&self) -> Result<JamsDocument, DatasetError> {
        let melody = self.melody()?;
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

/// The Orchset dataset module.
#[derive(Debug, Clone, Copy)]
pub struct Orchset {
    /// Parsed embedded index.
    index: &'static TrackIndex,
}

impl Orchset {
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

impl DatasetModule for Orchset {
    fn name(&self) -> &'static str {
        "orchset"
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
            has_archive: true,
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
            let track = OrchsetTrack::from_index(id.clone(), home.clone(), files)?;
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
        Ok(Box::new(OrchsetTrack::from_index(id, home, files)?))
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
    fn load_melody_parses_tab_separated_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ex1.mel");
        fs::write(&path, "0.000000\t0.000\n0.010000\t440.000\n0.020000\t441.830\n").unwrap();
        let melody = load_melody(&path).unwrap();
        assert_eq!(melody.times.len(), 3);
        assert!((melody.frequencies[1] - 440.0).abs() < 1e-9);
        assert_eq!(melody.confidence, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn load_melody_rejects_fake_path_with_io() {
        let err = load_melody(Path::new("a/fake/filepath")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn load_melody_rejects_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.mel");
        fs::write(&path, "no-tab-here\n").unwrap();
        assert!(matches!(
            load_melody(&path),
            Err(DatasetError::Parse { .. })
        ));
    }

    #[test]
    fn track_binds_paths_without_io() {
        let module = Orchset::new().unwrap();
        let track = module.track("Beethoven-S3-I-ex1", Some(Path::new("casa/de/data"))).unwrap();
        assert_eq!(track.data_home(), Path::new("casa/de/data"));
        assert_eq!(track.track_id().as_str(), "Beethoven-S3-I-ex1");
        assert!(!format!("{track}").is_empty());
    }

    #[test]
    fn unknown_and_malformed_ids_are_rejected() {
        let module = Orchset::new().unwrap();
        assert!(module.track("~faketrackid~?!", None).unwrap_err().is_invalid_track_id());
        assert!(module.track("not-a-real-track", None).unwrap_err().is_invalid_track_id());
    }

    #[test]
    fn construction_parses_the_embedded_index() {
        let module = Orchset::new().unwrap();
        assert!(!module.track_ids().is_empty());
    }

    #[test]
    fn track_ids_match_load_keys() {
        let module = Orchset::new().unwrap();
        let ids = module.track_ids();
        let loaded = module.load(None).unwrap();
        assert_eq!(ids.len(), loaded.len());
        assert!(ids.iter().all(|id| loaded.contains_key(id)));
    }

    #[test]
    fn declared_surface_matches_derived_surface() {
        let module = Orchset::new().unwrap();
        assert_eq!(
            module.download_surface(),
            DownloadSurface::for_remotes(module.remotes())
        );
    }
}
