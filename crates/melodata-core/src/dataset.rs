// crates/melodata-core/src/dataset.rs
// ============================================================================
// Module: Dataset Module Interface
// Description: The uniform API surface every dataset module satisfies.
// Purpose: Define the conformance contract as an explicit trait.
// Dependencies: crate::download, crate::error, crate::identifiers, crate::track
// ============================================================================

//! ## Overview
//! Every dataset module exposes the same operations: `cite`, `download`,
//! `validate`, `track_ids`, `load`, a Track constructor, and a family of
//! annotation loaders described by [`LoaderSpec`]s. The trait is explicit
//! rather than duck-typed: the registry checks the declared download surface
//! against the surface derived from the declared remotes at registration
//! time, and the conformance checker exercises every operation uniformly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::download::DownloadError;
use crate::download::DownloadOptions;
use crate::download::DownloadSurface;
use crate::download::RemoteFetcher;
use crate::error::DatasetError;
use crate::identifiers::TrackId;
use crate::remote::RemoteSet;
use crate::track::Track;

// ============================================================================
// SECTION: Validation Reporting
// ============================================================================

/// Where validation findings are written.
///
/// The silent variant suppresses all output; the verbose variant writes one
/// line per missing or mismatching file to the supplied sink.
pub enum ValidationReporting<'w> {
    /// Suppress all output.
    Silent,
    /// Write findings to the given sink.
    Verbose(&'w mut dyn io::Write),
}

/// Validation findings for one dataset.
///
/// # Invariants
/// - Paths are data-home-relative, grouped by track id.
/// - Findings are reported in the value; they are never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Indexed files absent from the data-home, keyed by track id.
    pub missing_files: BTreeMap<String, Vec<String>>,
    /// Files whose checksum does not match the index, keyed by track id.
    pub invalid_checksums: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    /// Returns true when every indexed file is present and matches.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty() && self.invalid_checksums.is_empty()
    }
}

// ============================================================================
// SECTION: Loader Specs
// ============================================================================

/// Extra keyword-style arguments required by some loaders.
///
/// # Invariants
/// - Values are looked up by name; absent names yield `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoaderArgs {
    /// Argument values keyed by name.
    values: BTreeMap<String, Value>,
}

impl LoaderArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one named argument, returning the updated set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Looks up an unsigned integer argument by name.
    #[must_use]
    pub fn get_u32(&self, name: &str) -> Option<u32> {
        self.values.get(name).and_then(Value::as_u64).and_then(|v| u32::try_from(v).ok())
    }
}

/// Uniform probe signature wrapping a typed annotation loader.
type LoaderProbe = fn(&Path, &LoaderArgs) -> Result<(), DatasetError>;

/// Descriptor of one `load_<annotation>` function.
///
/// # Invariants
/// - `invoke` verifies file existence before parsing: a nonexistent path
///   yields [`DatasetError::Io`], never a parse error or success.
#[derive(Debug, Clone, Copy)]
pub struct LoaderSpec {
    /// Loader name, `load_`-prefixed (for example `load_beats`).
    pub name: &'static str,
    /// Names of required extra arguments beyond the file path.
    pub required_args: &'static [&'static str],
    /// Adapter invoking the typed loader and discarding its value.
    probe: LoaderProbe,
}

impl LoaderSpec {
    /// Creates a loader descriptor.
    #[must_use]
    pub const fn new(
        name: &'static str,
        required_args: &'static [&'static str],
        probe: LoaderProbe,
    ) -> Self {
        Self {
            name,
            required_args,
            probe,
        }
    }

    /// Invokes the loader with a path and extra arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying loader returns; a nonexistent path
    /// must yield [`DatasetError::Io`].
    pub fn invoke(&self, path: &Path, args: &LoaderArgs) -> Result<(), DatasetError> {
        (self.probe)(path, args)
    }
}

// ============================================================================
// SECTION: Dataset Module Trait
// ============================================================================

/// The uniform API surface of one dataset module.
///
/// # Invariants
/// - `track_ids()` has no duplicates and equals the key set of `load()`.
/// - `load()` performs no file I/O per track (annotations are lazy).
/// - `track()` rejects malformed and unknown ids with
///   [`DatasetError::InvalidTrackId`].
/// - `download_surface()` equals `DownloadSurface::for_remotes(remotes())`;
///   the registry rejects modules where it does not.
pub trait DatasetModule {
    /// Returns the unique lowercase module name.
    fn name(&self) -> &'static str;

    /// Returns the directory name under the data-home root.
    fn dataset_dir(&self) -> &'static str;

    /// Returns the BibTeX citation for the dataset.
    fn cite(&self) -> &'static str;

    /// Returns the declared remote files, when the dataset is downloadable.
    fn remotes(&self) -> Option<&RemoteSet>;

    /// Returns the declared download surface.
    fn download_surface(&self) -> DownloadSurface;

    /// Downloads the dataset through the supplied fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on unaccepted options, transfer failure, or
    /// checksum mismatch.
    fn download(
        &self,
        options: &DownloadOptions,
        fetcher: &dyn RemoteFetcher,
    ) -> Result<(), DownloadError>;

    /// Validates local files against the embedded index.
    ///
    /// Missing and mismatching files are findings in the report, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] only on index corruption or unreadable local
    /// files, never for absent ones.
    fn validate(
        &self,
        data_home: Option<&Path>,
        reporting: ValidationReporting<'_>,
    ) -> Result<ValidationReport, DatasetError>;

    /// Returns the unique track ids of the dataset.
    fn track_ids(&self) -> Vec<TrackId>;

    /// Constructs every track, keyed by id.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] on index corruption.
    fn load(
        &self,
        data_home: Option<&Path>,
    ) -> Result<BTreeMap<TrackId, Box<dyn Track>>, DatasetError>;

    /// Constructs one track by id.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidTrackId`] for malformed or unknown ids.
    fn track(&self, track_id: &str, data_home: Option<&Path>)
    -> Result<Box<dyn Track>, DatasetError>;

    /// Returns descriptors for the module's `load_<annotation>` family.
    fn loaders(&self) -> Vec<LoaderSpec>;
}
