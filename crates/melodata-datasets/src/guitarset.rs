// crates/melodata-datasets/src/guitarset.rs
// ============================================================================
// Module: GuitarSet Dataset
// Description: GuitarSet hexaphonic guitar recording dataset module.
// Purpose: Expose per-string pitch and note annotations behind the uniform
//          surface.
// Dependencies: melodata-core, melodata-download, serde, serde_json,
//               crate::support
// ============================================================================

//! ## Overview
//! GuitarSet annotates each recording per guitar string: every string carries
//! a pitch contour and a list of note events, stored together in one JSON
//! file per track. The per-string loaders therefore take a `string_num`
//! argument in addition to the file path. The dataset is distributed as
//! multiple ZIP archives, so its download surface accepts every option.

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
use melodata_core::Interval;
use melodata_core::JamsDocument;
use melodata_core::LoaderArgs;
use melodata_core::LoaderSpec;
use melodata_core::NoteData;
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
const DATASET_DIR: &str = "GuitarSet";

/// BibTeX citation for the dataset.
const CITATION: &str = r"@inproceedings{xi2018guitarset,
  title={Guitar{S}et: A dataset for guitar transcription},
  author={Xi, Qingyang and Bittner, Rachel M. and Pauwels, Johan and
          Ye, Xuzhou and Bello, Juan P.},
  booktitle={Proceedings of the 19th International Society for Music
             Information Retrieval Conference (ISMIR)},
  year={2018}
}";

/// Embedded track index.
const INDEX_JSON: &str = include_str!("../indexes/guitarset_index.json");

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
                    "annotation.zip",
                    "https://zenodo.org/record/3371780/files/annotation.zip",
                    "f79d55d57cfb24f42f142d5664bb10a63ba91d22a1c26f18cbdd316b346b6c7e",
                ),
            ),
            (
                RemoteKey::new("audio_mic"),
                RemoteFile::new(
                    "audio_mono-mic.zip",
                    "https://zenodo.org/record/3371780/files/audio_mono-mic.zip",
                    "0a8f3e5e4e3c9f31b5f22f6e26f117117a3578023b6a4f6a1e7e961cc4bd7f2d",
                ),
            ),
        ])
    })
}

// ============================================================================
// SECTION: Annotation File Format
// ============================================================================

/// On-disk annotation file: per-string data keyed by string number.
#[derive(Debug, Deserialize)]
struct RawAnnotation {
    /// Per-string annotations keyed by string number (`"1"` to `"6"`).
    strings: BTreeMap<String, RawString>,
}

/// On-disk annotations for one guitar string.
#[derive(Debug, Deserialize)]
struct RawString {
    /// Sampled pitch contour columns.
    pitch_contour: RawContour,
    /// Note event columns.
    notes: RawNotes,
}

/// On-disk pitch contour columns.
#[derive(Debug, Deserialize)]
struct RawContour {
    /// Sample times in seconds.
    times: Vec<f64>,
    /// Fundamental frequency in Hz, 0 for unvoiced frames.
    frequencies: Vec<f64>,
    /// Per-frame voicing confidence in `[0, 1]`.
    confidence: Vec<f64>,
}

/// On-disk note event columns.
#[derive(Debug, Deserialize)]
struct RawNotes {
    /// Onset/offset pairs in seconds.
    intervals: Vec<[f64; 2]>,
    /// Note pitches in Hz.
    notes_hz: Vec<f64>,
    /// Per-note confidence, `null` when unannotated.
    confidence: Vec<Option<f64>>,
}

/// Parses one annotation file, checking existence first.
fn parse_annotation(path: &Path) -> Result<RawAnnotation, DatasetError> {
    let raw = support::read_annotation(path)?;
    serde_json::from_str(&raw).map_err(|err| DatasetError::Parse {
        path: path.to_path_buf(),
        reason: format!("malformed annotation json: {err}"),
    })
}

/// Looks up one string's annotations within a parsed file.
fn string_entry<'a>(
    parsed: &'a RawAnnotation,
    string_num: u32,
    path: &Path,
) -> Result<&'a RawString, DatasetError> {
    parsed.strings.get(&string_num.to_string()).ok_or_else(|| DatasetError::Parse {
        path: path.to_path_buf(),
        reason: format!("no annotations for string {string_num}"),
    })
}

/// Converts on-disk contour columns into validated f0 data.
fn contour_to_f0(contour: &RawContour, path: &Path) -> Result<F0Data, DatasetError> {
    F0Data::new(
        contour.times.clone(),
        contour.frequencies.clone(),
        contour.confidence.clone(),
    )
    .map_err(|err| support::annotation_error(path, err))
}

/// Converts on-disk note columns into validated note data.
fn notes_to_data(notes: &RawNotes, path: &Path) -> Result<NoteData, DatasetError> {
    let mut intervals = Vec::with_capacity(notes.intervals.len());
    for [start, end] in &notes.intervals {
        intervals.push(
            Interval::new(*start, *end).map_err(|err| support::annotation_error(path, err))?,
        );
    }
    NoteData::new(intervals, notes.notes_hz.clone(), notes.confidence.clone())
        .map_err(|err| support::annotation_error(path, err))
}

// ============================================================================
// SECTION: Loaders
// ============================================================================

/// Loads the pitch contour of one guitar string from an annotation file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path, [`DatasetError::Parse`]
/// for malformed JSON or an unannotated string, and
/// [`DatasetError::Annotation`] for invalid values.
pub fn load_pitch_contour(path: &Path, string_num: u32) -> Result<F0Data, DatasetError> {
    let parsed = parse_annotation(path)?;
    contour_to_f0(&string_entry(&parsed, string_num, path)?.pitch_contour, path)
}

/// Loads the note events of one guitar string from an annotation file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] for a nonexistent path, [`DatasetError::Parse`]
/// for malformed JSON or an unannotated string, and
/// [`DatasetError::Annotation`] for invalid values.
pub fn load_notes(path: &Path, string_num: u32) -> Result<NoteData, DatasetError> {
    let parsed = parse_annotation(path)?;
    notes_to_data(&string_entry(&parsed, string_num, path)?.notes, path)
}

/// Extracts the required `string_num` argument.
fn require_string_num(args: &LoaderArgs) -> Result<u32, DatasetError> {
    args.get_u32("string_num").ok_or(DatasetError::MissingLoaderArg { name: "string_num" })
}

/// Probe adapter for [`load_pitch_contour`].
fn probe_pitch_contour(path: &Path, args: &LoaderArgs) -> Result<(), DatasetError> {
    load_pitch_contour(path, require_string_num(args)?).map(drop)
}

/// Probe adapter for [`load_notes`].
fn probe_notes(path: &Path, args: &LoaderArgs) -> Result<(), DatasetError> {
    load_notes(path, require_string_num(args)?).map(drop)
}

// ============================================================================
// SECTION: Track
// ============================================================================

/// Validated per-string annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct StringAnnotation {
    /// Pitch contour of the string.
    pub pitch_contour: F0Data,
    /// Note events of the string.
    pub notes: NoteData,
}

/// One GuitarSet recording with its per-string annotations.
#[derive(Debug)]
pub struct GuitarsetTrack {
    /// Validated track id.
    track_id: TrackId,
    /// Data-home the track was bound to.
    data_home: PathBuf,
    /// Indexed annotation file path.
    annotation_path: PathBuf,
    /// Lazily parsed per-string annotations.
    strings: OnceCell<BTreeMap<u32, StringAnnotation>>,
}

impl GuitarsetTrack {
    /// Binds a track to its indexed files without touching the filesystem.
    fn from_index(
        track_id: TrackId,
        data_home: PathBuf,
        files: &BTreeMap<String, IndexEntry>,
    ) -> Result<Self, DatasetError> {
        let annotation_path = support::indexed_path(&data_home, files, "annotation", &track_id)?;
        Ok(Self {
            track_id,
            data_home,
            annotation_path,
            strings: OnceCell::new(),
        })
    }

    /// Returns the indexed annotation file path.
    #[must_use]
    pub fn annotation_path(&self) -> &Path {
        &self.annotation_path
    }

    /// Returns every annotated string, parsing the file on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when the annotation file is absent or
    /// malformed.
    pub fn strings(&self) -> Result<&BTreeMap<u32, StringAnnotation>, DatasetError> {
        if let Some(strings) = self.strings.get() {
            return Ok(strings);
        }
        let parsed = parse_annotation(&self.annotation_path)?;
        let mut strings = BTreeMap::new();
        for (raw_num, entry) in &parsed.strings {
            let string_num = raw_num.parse::<u32>().map_err(|_| DatasetError::Parse {
                path: self.annotation_path.clone(),
                reason: format!("string key `{raw_num}` is not a number"),
            })?;
            strings.insert(
                string_num,
                StringAnnotation {
                    pitch_contour: contour_to_f0(&entry.pitch_contour, &self.annotation_path)?,
                    notes: notes_to_data(&entry.notes, &self.annotation_path)?,
                },
            );
        }
        Ok(self.strings.get_or_init(|| strings))
    }

    /// Returns the pitch contour of one string.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Parse`] when the string is not annotated.
    pub fn pitch_contour(&self, string_num: u32) -> Result<&F0Data, DatasetError> {
        self.strings()?.get(&string_num).map(|entry| &entry.pitch_contour).ok_or_else(|| {
            DatasetError::Parse {
                path: self.annotation_path.clone(),
                reason: format!("no annotations for string {string_num}"),
            }
        })
    }

    /// Returns the note events of one string.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Parse`] when the string is not annotated.
    pub fn notes(&self, string_num: u32) -> Result<&NoteData, DatasetError> {
        self.strings()?.get(&string_num).map(|entry| &entry.notes).ok_or_else(|| {
            DatasetError::Parse {
                path: self.annotation_path.clone(),
                reason: format!("no annotations for string {string_num}"),
            }
        })
    }
}

impl fmt::Display for GuitarsetTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guitarset track {}", self.track_id)
    }
}

impl Track for GuitarsetTrack {
    fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    fn data_home(&self) -> &Path {
        &self.data_home
    }

    fn to_jams(&self) -> Result<JamsDocument, DatasetError> {
        let strings = self.strings()?;
        let duration = strings
            .values()
            .flat_map(|entry| {
                entry
                    .pitch_contour
                    .times
                    .last()
                    .copied()
                    .into_iter()
                    .chain(entry.notes.intervals.last().map(|interval| interval.end))
            })
            .fold(0.0_f64, f64::max);
        let mut doc = JamsDocument::new(duration)?;
        doc.set_title(self.track_id.as_str());
        for entry in strings.values() {
            doc.push_f0(&entry.pitch_contour);
            doc.push_notes(&entry.notes);
        }
        Ok(doc)
    }
}

// ============================================================================
// SECTION: Dataset Module
// ============================================================================

/// The GuitarSet dataset module.
#[derive(Debug, Clone, Copy)]
pub struct Guitarset {
    /// Parsed embedded index.
    index: &'static TrackIndex,
}

impl Guitarset {
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

impl DatasetModule for Guitarset {
    fn name(&self) -> &'static str {
        "guitarset"
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
            let track = GuitarsetTrack::from_index(id.clone(), home.clone(), files)?;
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
        Ok(Box::new(GuitarsetTrack::from_index(id, home, files)?))
    }

    fn loaders(&self) -> Vec<LoaderSpec> {
        vec![
            LoaderSpec::new("load_pitch_contour", &["string_num"], probe_pitch_contour),
            LoaderSpec::new("load_notes", &["string_num"], probe_notes),
        ]
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

    /// Minimal one-string annotation file.
    const SAMPLE: &str = r#"{
        "strings": {
            "1": {
                "pitch_contour": {
                    "times": [0.0, 0.011609],
                    "frequencies": [0.0, 82.407],
                    "confidence": [0.0, 1.0]
                },
                "notes": {
                    "intervals": [[0.011609, 0.52]],
                    "notes_hz": [82.407],
                    "confidence": [null]
                }
            }
        }
    }"#;

    #[test]
    fn loaders_parse_per_string_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        fs::write(&path, SAMPLE).unwrap();
        let contour = load_pitch_contour(&path, 1).unwrap();
        assert_eq!(contour.times.len(), 2);
        let notes = load_notes(&path, 1).unwrap();
        assert_eq!(notes.confidence, vec![None]);
    }

    #[test]
    fn loaders_reject_unannotated_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        fs::write(&path, SAMPLE).unwrap();
        assert!(matches!(
            load_pitch_contour(&path, 6),
            Err(DatasetError::Parse { .. })
        ));
    }

    #[test]
    fn loaders_reject_fake_paths_with_io() {
        let fake = Path::new("a/fake/filepath");
        assert!(load_pitch_contour(fake, 1).unwrap_err().is_io());
        assert!(load_notes(fake, 1).unwrap_err().is_io());
    }

    #[test]
    fn probes_require_the_string_num_argument() {
        let module = Guitarset::new().unwrap();
        let specs = module.loaders();
        assert!(specs.iter().all(|spec| spec.required_args == ["string_num"]));
        let err = specs[0].invoke(Path::new("a/fake/filepath"), &LoaderArgs::new()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingLoaderArg { name: "string_num" }));
        let args = LoaderArgs::new().with("string_num", 1);
        let err = specs[0].invoke(Path::new("a/fake/filepath"), &args).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn track_caches_parsed_strings() {
        let module = Guitarset::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("annotation")).unwrap();
        fs::write(dir.path().join("annotation/03_BN3-119-G_solo.json"), SAMPLE).unwrap();
        let track = module.track("03_BN3-119-G_solo", Some(dir.path())).unwrap();
        let jams = track.to_jams().unwrap();
        jams.validate_schema().unwrap();
    }

    #[test]
    fn unknown_and_malformed_ids_are_rejected() {
        let module = Guitarset::new().unwrap();
        assert!(module.track("~faketrackid~?!", None).unwrap_err().is_invalid_track_id());
        assert!(module.track("unknown_take", None).unwrap_err().is_invalid_track_id());
    }

    #[test]
    fn declared_surface_matches_derived_surface() {
        let module = Guitarset::new().unwrap();
        assert_eq!(
            module.download_surface(),
            DownloadSurface::for_remotes(module.remotes())
        );
    }
}
