// crates/melodata-datasets/src/beatles.rs
// ============================================================================
// Module: Beatles Dataset
// Description: Isophonics Beatles annotation dataset module.
// Purpose: Expose beat, chord, section, and key annotations behind the
//          uniform surface.
// Dependencies: melodata-core, melodata-download, crate::support
// ============================================================================

//! ## Overview
//! The Beatles dataset carries four annotation families per track: beat
//! times with metrical positions, chord labels, section labels, and key
//! labels. Beats are whitespace-separated `time position` rows; the labeled
//! families are `start end label` rows. The dataset is distributed as one
//! gzip-tar of annotations plus a plain title listing, so its download
//! surface accepts every option.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use melodata_core::BeatData;
use melodata_core::ChordData;
use melodata_core::DatasetError;
use melodata_core::DatasetModule;
use melodata_core::DownloadError;
use melodata_core::DownloadOptions;
use melodata_core::DownloadSurface;
use melodata_core::IndexEntry;
use melodata_core::Interval;
use melodata_core::JamsDocument;
use melodata_core::KeyData;
use melodata_core::LoaderArgs;
use melodata_core::LoaderSpec;
use melodata_core::RemoteCardinality;
use melodata_core::RemoteFetcher;
use melodata_core::RemoteFile;
use melodata_core::RemoteKey;
use melodata_core::RemoteSet;
use melodata_core::SectionData;
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
const DATASET_DIR: &str = "Beatles";

/// BibTeX citation for the dataset.
const CITATION: &str = r"@inproceedings{mauch2009omras2,
  title={{OMRAS2} metadata project 2009},
  author={Mauch, Matthias and Cannam, Chris and Davies, Matthew and
          Dixon, Simon and Harte, Christopher and Kolozali, Sefki and
          Tidhar, Dan and Sandler, Mark},
  booktitle={Proceedings of the 10th International Society for Music
             Information Retrieval Conference (ISMIR), Late-Breaking Demo},
  year={2009}
}";

/// Embedded track index.
const INDEX_JSON: &str = include_str!("../indexes/beatles_index.json");

/// Lazily parsed index cell.
static INDEX: OnceLock<TrackIndex> = OnceLock::new();

/// Lazily built remote set cell.
static REMOTES: OnceLock<RemoteSet> = OnceLock::new();

/// Returns the declared remote files.
fn remotes() -> &'static RemoteSet {
    REMOTES.get_or_init(|| {
        RemoteSet::from_entries([
            (
                RemoteKey::new("annotations"),
                RemoteFile::new(
                    "The Beatles Annotations.tar.gz",
                    "http://isophonics.net/files/annotations/The%20Beatles%20Annotations.tar.gz",
                    "0f23b957a76804ce52174c54a2f821bfcf1d1c2c3a9de86c4f71da86b5b2c6f5",
                ),
            ),
            (
                RemoteKey::new("titles"),
                RemoteFile::new(
                    "beatles_titles.csv",
                    "http://isophonics.net/files/annotations/beatles_titles.csv",
                    "c1f96325cd9d6e39ab1e37ffba7dbd0c2560c2f4f9c78c0d145bf9a26a44ba0e",
                ),
            ),
        ])
    })
}

// ============================================================================
// SECTION: Loaders
// ============================================================================

/// Loads a Beatles beat file: whitespace-separated `time position` rows.
///
/// Non-numeric position labels (a handful of files annotate pickup beats
/// textually) are kept as unannotated positions.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path, [`DatasetError::Parse`]
/// for malformed rows, and [`DatasetError::Annotation`] for invalid times.
pub fn load_beats(path: &Path) -> Result<BeatData, DatasetError> {
    let raw = support::read_annotation(path)?;
    let mut times = Vec::new();
    let mut positions = Vec::new();
    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        let mut fields = line.split_whitespace();
        let Some(time) = fields.next() else {
            return Err(DatasetError::Parse {
                path: path.to_path_buf(),
                reason: format!("expected `time position`, found `{line}`"),
            });
        };
        times.push(support::parse_f64(time, path)?);
        positions.push(fields.next().and_then(|field| field.parse::<u32>().ok()));
    }
    BeatData::new(times, positions).map_err(|err| support::annotation_error(path, err))
}

/// Parses a `.lab` file of `start end label` rows into intervals and labels.
fn parse_labeled(path: &Path) -> Result<(Vec<Interval>, Vec<String>), DatasetError> {
    let raw = support::read_annotation(path)?;
    let mut intervals = Vec::new();
    let mut labels = Vec::new();
    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        let mut fields = line.splitn(3, char::is_whitespace);
        let (Some(start), Some(end), Some(label)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(DatasetError::Parse {
                path: path.to_path_buf(),
                reason: format!("expected `start end label`, found `{line}`"),
            });
        };
        let interval = Interval::new(
            support::parse_f64(start, path)?,
            support::parse_f64(end, path)?,
        )
        .map_err(|err| support::annotation_error(path, err))?;
        intervals.push(interval);
        labels.push(label.trim().to_string());
    }
    Ok((intervals, labels))
}

/// Loads a Beatles chord `.lab` file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path and
/// [`DatasetError::Parse`] or [`DatasetError::Annotation`] for malformed rows.
pub fn load_chords(path: &Path) -> Result<ChordData, DatasetError> {
    let (intervals, labels) = parse_labeled(path)?;
    ChordData::new(intervals, labels).map_err(|err| support::annotation_error(path, err))
}

/// Loads a Beatles section `.lab` file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path and
/// [`DatasetError::Parse`] or [`DatasetError::Annotation`] for malformed rows.
pub fn load_sections(path: &Path) -> Result<SectionData, DatasetError> {
    let (intervals, labels) = parse_labeled(path)?;
    SectionData::new(intervals, labels).map_err(|err| support::annotation_error(path, err))
}

/// Loads a Beatles key `.lab` file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path and
/// [`DatasetError::Parse`] or [`DatasetError::Annotation`] for malformed rows.
pub fn load_key(path: &Path) -> Result<KeyData, DatasetError> {
    let (intervals, keys) = parse_labeled(path)?;
    KeyData::new(intervals, keys).map_err(|err| support::annotation_error(path, err))
}

/// Probe adapter for [`load_beats`].
fn probe_beats(path: &Path, _args: &LoaderArgs) -> Result<(), DatasetError> {
    load_beats(path).map(drop)
}

/// Probe adapter for [`load_chords`].
fn probe_chords(path: &Path, _args: &LoaderArgs) -> Result<(), DatasetError> {
    load_chords(path).map(drop)
}

/// Probe adapter for [`load_sections`].
fn probe_sections(path: &Path, _args: &LoaderArgs) -> Result<(), DatasetError> {
    load_sections(path).map(drop)
}

/// Probe adapter for [`load_key`].
fn probe_key(path: &Path, _args: &LoaderArgs) -> Result<(), DatasetError> {
    load_key(path).map(drop)
}

// ============================================================================
// SECTION: Track
// ============================================================================

/// One Beatles track with its four annotation families.
#[derive(Debug)]
pub struct BeatlesTrack {
    /// Validated track id.
    track_id: TrackId,
    /// Data-home the track was bound to.
    data_home: PathBuf,
    /// Indexed beat file path.
    beats_path: PathBuf,
    /// Indexed chord file path.
    chords_path: PathBuf,
    /// Indexed section file path.
    sections_path: PathBuf,
    /// Indexed key file path.
    key_path: PathBuf,
    /// Lazily parsed beats.
    beats: OnceCell<BeatData>,
    /// Lazily parsed chords.
    chords: OnceCell<ChordData>,
    /// Lazily parsed sections.
    sections: OnceCell<SectionData>,
    /// Lazily parsed key.
    key: OnceCell<KeyData>,
}

impl BeatlesTrack {
    /// Binds a track to its indexed files without touching the filesystem.
    fn from_index(
        track_id: TrackId,
        data_home: PathBuf,
        files: &BTreeMap<String, IndexEntry>,
    ) -> Result<Self, DatasetError> {
        let beats_path = support::indexed_path(&data_home, files, "beat", &track_id)?;
        let chords_path = support::indexed_path(&data_home, files, "chords", &track_id)?;
        let sections_path = support::indexed_path(&data_home, files, "sections", &track_id)?;
        let key_path = support::indexed_path(&data_home, files, "keys", &track_id)?;
        Ok(Self {
            track_id,
            data_home,
            beats_path,
            chords_path,
            sections_path,
            key_path,
            beats: OnceCell::new(),
            chords: OnceCell::new(),
            sections: OnceCell::new(),
            key: OnceCell::new(),
        })
    }

    /// Returns the beat annotation, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the beat file is absent or malformed.
    pub fn beats(&self) -> Result<&BeatData, DatasetError> {
        if let Some(beats) = self.beats.get() {
            return Ok(beats);
        }
        let parsed = load_beats(&self.beats_path)?;
        Ok(self.beats.get_or_init(|| parsed))
    }

    /// Returns the chord annotation, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the chord file is absent or malformed.
    pub fn chords(&self) -> Result<&ChordData, DatasetError> {
        if let Some(chords) = self.chords.get() {
            return Ok(chords);
        }
        let parsed = load_chords(&self.chords_path)?;
        Ok(self.chords.get_or_init(|| parsed))
    }

    /// Returns the section annotation, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the section file is absent or malformed.
    pub fn sections(&self) -> Result<&SectionData, DatasetError> {
        if let Some(sections) = self.sections.get() {
            return Ok(sections);
        }
        let parsed = load_sections(&self.sections_path)?;
        Ok(self.sections.get_or_init(|| parsed))
    }

    /// Returns the key annotation, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the key file is absent or malformed.
    pub fn key(&self) -> Result<&KeyData, DatasetError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }
        let parsed = load_key(&self.key_path)?;
        Ok(self.key.get_or_init(|| parsed))
    }
}

impl fmt::Display for BeatlesTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "beatles track {}", self.track_id)
    }
}

impl Track for BeatlesTrack {
    fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    fn data_home(&self) -> &Path {
        &self.data_home
    }

    fn to_jams(&self) -> Result<JamsDocument, DatasetError> {
        let sections = self.sections()?;
        let duration = sections.intervals.last().map_or(0.0, |interval| interval.end);
        let mut doc = JamsDocument::new(duration)?;
        doc.set_title(self.track_id.as_str());
        doc.set_artist("The Beatles");
        doc.push_beats(self.beats()?);
        doc.push_chords(self.chords()?);
        doc.push_sections(sections);
        doc.push_key(self.key()?);
        Ok(doc)
    }
}

// ============================================================================
// SECTION: Dataset Module
// ============================================================================

/// The Beatles dataset module.
#[derive(Debug, Clone, Copy)]
pub struct Beatles {
    /// Parsed embedded index.
    index: &'static TrackIndex,
}

impl Beatles {
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

impl DatasetModule for Beatles {
    fn name(&self) -> &'static str {
        "beatles"
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
            cardinality: RemoteCardinality::Multiple,
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
            let track = BeatlesTrack::from_index(id.clone(), home.clone(), files)?;
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
        Ok(Box::new(BeatlesTrack::from_index(id, home, files)?))
    }

    fn loaders(&self) -> Vec<LoaderSpec> {
        vec![
            LoaderSpec::new("load_beats", &[], probe_beats),
            LoaderSpec::new("load_chords", &[], probe_chords),
            LoaderSpec::new("load_sections", &[], probe_sections),
            LoaderSpec::new("load_key", &[], probe_key),
        ]
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
