// crates/melodata-core/src/error.rs
// ============================================================================
// Module: Dataset Errors
// Description: Error taxonomy shared by every dataset module.
// Purpose: Standardize the errors the conformance contract depends on.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The contract pins two error behaviors across all dataset modules: track
//! construction rejects malformed or unknown ids with
//! [`DatasetError::InvalidTrackId`], and every annotation loader rejects a
//! nonexistent file path with [`DatasetError::Io`] before attempting to
//! parse. The remaining variants cover malformed embedded indexes, malformed
//! annotation content, and JAMS assembly or schema failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::annotations::AnnotationError;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Errors produced by dataset modules.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `InvalidTrackId` is the only error Track construction may raise for a
///   bad id; `Io` is the only error a loader may raise for a missing file.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Track id is malformed or not present in the dataset index.
    #[error("invalid track id `{track_id}`: {reason}")]
    InvalidTrackId {
        /// The offending track id as supplied by the caller.
        track_id: String,
        /// Why the id was rejected.
        reason: String,
    },

    /// File access failed (missing file, unreadable file).
    #[error("io error for `{path}`: {source}")]
    Io {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Embedded track index is malformed.
    #[error("index error: {0}")]
    Index(String),

    /// Annotation file content is malformed.
    #[error("annotation error for `{path}`: {source}")]
    Annotation {
        /// Path of the malformed annotation file.
        path: PathBuf,
        /// Underlying annotation construction error.
        #[source]
        source: AnnotationError,
    },

    /// Annotation file content could not be parsed.
    #[error("parse error for `{path}`: {reason}")]
    Parse {
        /// Path of the unparseable annotation file.
        path: PathBuf,
        /// Why parsing failed.
        reason: String,
    },

    /// A loader was invoked without a required extra argument.
    #[error("missing required loader argument `{name}`")]
    MissingLoaderArg {
        /// Name of the absent argument.
        name: &'static str,
    },

    /// JAMS document assembly or schema validation failed.
    #[error("jams error: {0}")]
    Jams(String),

    /// The validation report sink could not be written.
    #[error("validation report sink error: {0}")]
    ReportSink(String),
}

impl DatasetError {
    /// Builds the standard missing-file error a loader must return when its
    /// path does not exist.
    #[must_use]
    pub fn missing_file(path: PathBuf) -> Self {
        Self::Io {
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "annotation file not found",
            ),
            path,
        }
    }

    /// Returns true when the error is the I/O kind required of loaders.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true when the error is the invalid-argument kind required of
    /// Track construction.
    #[must_use]
    pub const fn is_invalid_track_id(&self) -> bool {
        matches!(self, Self::InvalidTrackId { .. })
    }
}
