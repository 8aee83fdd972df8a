// crates/melodata-core/src/download.rs
// ============================================================================
// Module: Download Surface and Options
// Description: Statically derived download parameter rules per remote set.
// Purpose: Replace signature reflection with registration-time conformance.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Which download parameters a dataset accepts is fully determined by its
//! declared remotes: no remotes means a bare `data_home`-only surface; any
//! remotes add `force_overwrite`; two or more remotes add `partial_download`;
//! any ZIP/gzip remote adds `cleanup` (default true). [`DownloadSurface`]
//! captures those rules as data. Modules declare their surface once, the
//! registry rejects declarations that disagree with the derived surface, and
//! [`DownloadSurface::check_options`] rejects option values a surface does
//! not accept at call time.
//!
//! Transfer and extraction mechanics stay behind the [`RemoteFetcher`] trait;
//! the conformance checker exercises downloads with a no-op stand-in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::identifiers::RemoteKey;
use crate::remote::RemoteFile;
use crate::remote::RemoteSet;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Download orchestration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// An option was set that the dataset's download surface does not accept.
    #[error("option `{option}` is not accepted by download surface {surface}")]
    OptionNotAccepted {
        /// Name of the rejected option.
        option: &'static str,
        /// Surface that rejected it.
        surface: DownloadSurface,
    },

    /// A partial-download key does not name a declared remote.
    #[error("unknown remote key `{key}`")]
    UnknownRemoteKey {
        /// The unrecognized key.
        key: RemoteKey,
    },

    /// Transfer of a remote file failed.
    #[error("fetch failed for `{filename}`: {reason}")]
    Fetch {
        /// Filename of the remote being fetched.
        filename: String,
        /// Why the transfer failed.
        reason: String,
    },

    /// Downloaded bytes do not match the declared checksum.
    #[error("checksum mismatch for `{filename}`: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Filename of the mismatching download.
        filename: String,
        /// Declared checksum.
        expected: String,
        /// Computed checksum.
        actual: String,
    },

    /// Archive extraction failed or the format is unsupported.
    #[error("archive error for `{path}`: {reason}")]
    Archive {
        /// Path of the archive.
        path: PathBuf,
        /// Why extraction failed.
        reason: String,
    },

    /// Local filesystem access failed.
    #[error("io error for `{path}`: {source}")]
    Io {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// SECTION: Download Surface
// ============================================================================

/// Number of remote files a dataset declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCardinality {
    /// No remotes; the dataset is obtained manually.
    None,
    /// Exactly one remote file.
    Single,
    /// Two or more remote files.
    Multiple,
}

/// Download parameter surface derived from a dataset's declared remotes.
///
/// # Invariants
/// - `has_archive` implies at least one remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSurface {
    /// How many remotes the dataset declares.
    pub cardinality: RemoteCardinality,
    /// True when any remote filename is a ZIP or gzip archive.
    pub has_archive: bool,
}

impl DownloadSurface {
    /// Derives the canonical surface from a declared remote set.
    #[must_use]
    pub fn for_remotes(remotes: Option<&RemoteSet>) -> Self {
        match remotes {
            None => Self {
                cardinality: RemoteCardinality::None,
                has_archive: false,
            },
            Some(set) if set.is_empty() => Self {
                cardinality: RemoteCardinality::None,
                has_archive: false,
            },
            Some(set) => Self {
                cardinality: if set.len() == 1 {
                    RemoteCardinality::Single
                } else {
                    RemoteCardinality::Multiple
                },
                has_archive: set.has_archive(),
            },
        }
    }

    /// Returns true when the surface accepts `force_overwrite`.
    #[must_use]
    pub const fn accepts_force_overwrite(&self) -> bool {
        !matches!(self.cardinality, RemoteCardinality::None)
    }

    /// Returns true when the surface accepts `partial_download`.
    #[must_use]
    pub const fn accepts_partial_download(&self) -> bool {
        matches!(self.cardinality, RemoteCardinality::Multiple)
    }

    /// Returns true when the surface accepts `cleanup`.
    #[must_use]
    pub const fn accepts_cleanup(&self) -> bool {
        self.has_archive
    }

    /// Rejects option values the surface does not accept.
    ///
    /// Default values are always accepted: a surface without a given
    /// parameter corresponds to options leaving that field at its default.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::OptionNotAccepted`] for the first option set
    /// to a non-default value the surface lacks.
    pub fn check_options(&self, options: &DownloadOptions) -> Result<(), DownloadError> {
        if options.force_overwrite && !self.accepts_force_overwrite() {
            return Err(DownloadError::OptionNotAccepted {
                option: "force_overwrite",
                surface: *self,
            });
        }
        if options.partial_download.is_some() && !self.accepts_partial_download() {
            return Err(DownloadError::OptionNotAccepted {
                option: "partial_download",
                surface: *self,
            });
        }
        if !options.cleanup && !self.accepts_cleanup() {
            return Err(DownloadError::OptionNotAccepted {
                option: "cleanup",
                surface: *self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for DownloadSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cardinality = match self.cardinality {
            RemoteCardinality::None => "no remotes",
            RemoteCardinality::Single => "single remote",
            RemoteCardinality::Multiple => "multiple remotes",
        };
        let archive = if self.has_archive { "with archives" } else { "without archives" };
        write!(f, "({cardinality}, {archive})")
    }
}

// ============================================================================
// SECTION: Download Options
// ============================================================================

/// Caller-supplied download options.
///
/// # Invariants
/// - Defaults mirror the contract: no data-home override, no overwrite, full
///   download, cleanup enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Destination directory override; the process default applies when unset.
    pub data_home: Option<PathBuf>,
    /// Re-download files that already exist locally.
    pub force_overwrite: bool,
    /// Restrict the download to the named remote keys; all remotes when unset.
    pub partial_download: Option<Vec<RemoteKey>>,
    /// Remove archives after extraction.
    pub cleanup: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            data_home: None,
            force_overwrite: false,
            partial_download: None,
            cleanup: true,
        }
    }
}

// ============================================================================
// SECTION: Remote Fetcher
// ============================================================================

/// Transfer and extraction mechanics behind the download entry point.
///
/// Implementations own all network and archive side effects; the conformance
/// checker substitutes a no-op stand-in.
pub trait RemoteFetcher {
    /// Fetches a remote file into `dest_dir` and returns the local path.
    ///
    /// An existing file is kept unless `force_overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on transfer or checksum failure.
    fn fetch(
        &self,
        remote: &RemoteFile,
        dest_dir: &Path,
        force_overwrite: bool,
    ) -> Result<PathBuf, DownloadError>;

    /// Unpacks a fetched archive into `dest_dir`, removing the archive
    /// afterwards when `cleanup` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on extraction failure.
    fn unpack(&self, archive: &Path, dest_dir: &Path, cleanup: bool) -> Result<(), DownloadError>;
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
    use crate::identifiers::RemoteKey;

    fn single_plain() -> RemoteSet {
        RemoteSet::from_entries([(
            RemoteKey::new("metadata"),
            RemoteFile::new("meta.csv", "https://example.com/meta.csv", "00"),
        )])
    }

    fn multiple_archives() -> RemoteSet {
        RemoteSet::from_entries([
            (
                RemoteKey::new("annotations"),
                RemoteFile::new("ann.zip", "https://example.com/ann.zip", "11"),
            ),
            (
                RemoteKey::new("audio"),
                RemoteFile::new("audio.zip", "https://example.com/audio.zip", "22"),
            ),
        ])
    }

    #[test]
    fn surface_derivation_covers_every_branch() {
        let none = DownloadSurface::for_remotes(None);
        assert_eq!(none.cardinality, RemoteCardinality::None);
        assert!(!none.accepts_force_overwrite());
        assert!(!none.accepts_partial_download());
        assert!(!none.accepts_cleanup());

        let single = DownloadSurface::for_remotes(Some(&single_plain()));
        assert_eq!(single.cardinality, RemoteCardinality::Single);
        assert!(single.accepts_force_overwrite());
        assert!(!single.accepts_partial_download());
        assert!(!single.accepts_cleanup());

        let multiple = DownloadSurface::for_remotes(Some(&multiple_archives()));
        assert_eq!(multiple.cardinality, RemoteCardinality::Multiple);
        assert!(multiple.accepts_partial_download());
        assert!(multiple.accepts_cleanup());
    }

    #[test]
    fn empty_remote_set_derives_the_bare_surface() {
        let surface = DownloadSurface::for_remotes(Some(&RemoteSet::default()));
        assert_eq!(surface.cardinality, RemoteCardinality::None);
        assert!(!surface.has_archive);
    }

    #[test]
    fn check_options_rejects_unaccepted_fields() {
        let bare = DownloadSurface::for_remotes(None);
        assert!(bare.check_options(&DownloadOptions::default()).is_ok());

        let forced = DownloadOptions {
            force_overwrite: true,
            ..DownloadOptions::default()
        };
        assert!(matches!(
            bare.check_options(&forced),
            Err(DownloadError::OptionNotAccepted {
                option: "force_overwrite",
                ..
            })
        ));

        let single = DownloadSurface::for_remotes(Some(&single_plain()));
        let partial = DownloadOptions {
            partial_download: Some(vec![RemoteKey::new("metadata")]),
            ..DownloadOptions::default()
        };
        assert!(matches!(
            single.check_options(&partial),
            Err(DownloadError::OptionNotAccepted {
                option: "partial_download",
                ..
            })
        ));

        let no_cleanup = DownloadOptions {
            cleanup: false,
            ..DownloadOptions::default()
        };
        assert!(matches!(
            single.check_options(&no_cleanup),
            Err(DownloadError::OptionNotAccepted {
                option: "cleanup",
                ..
            })
        ));

        let multiple = DownloadSurface::for_remotes(Some(&multiple_archives()));
        let everything = DownloadOptions {
            force_overwrite: true,
            partial_download: Some(vec![RemoteKey::new("annotations")]),
            cleanup: false,
            ..DownloadOptions::default()
        };
        assert!(multiple.check_options(&everything).is_ok());
    }
}
