// crates/melodata-core/src/track.rs
// ============================================================================
// Module: Track Interface
// Description: Common capability surface of one dataset item.
// Purpose: Give every dataset's Track a uniform, displayable, exportable shape.
// Dependencies: crate::error, crate::identifiers, crate::jams
// ============================================================================

//! ## Overview
//! A Track is one dataset item with its annotations. Implementations bind a
//! validated track id and a data-home directory at construction, stay
//! immutable afterwards, and load annotation files lazily on first access.
//! Every Track renders through [`std::fmt::Display`] without panicking and
//! exports to a JAMS document whose schema validity the conformance checker
//! asserts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;

use crate::error::DatasetError;
use crate::identifiers::TrackId;
use crate::jams::JamsDocument;

// ============================================================================
// SECTION: Track Trait
// ============================================================================

/// Common capability surface of one dataset item.
///
/// # Invariants
/// - `data_home` is exactly the path bound at construction (caller-supplied
///   paths pass through verbatim; the default is the process data-home joined
///   with the dataset directory).
/// - Implementations are immutable after construction.
pub trait Track: fmt::Debug + fmt::Display {
    /// Returns the validated track id.
    fn track_id(&self) -> &TrackId;

    /// Returns the data-home directory the track was bound to.
    fn data_home(&self) -> &Path;

    /// Exports the track's annotations as a JAMS document.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] when an annotation file is missing or
    /// malformed, or when document assembly fails.
    fn to_jams(&self) -> Result<JamsDocument, DatasetError>;
}
