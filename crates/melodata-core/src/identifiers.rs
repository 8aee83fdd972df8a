// crates/melodata-core/src/identifiers.rs
// ============================================================================
// Module: Melodata Identifiers
// Description: Validated identifiers for tracks and remote files.
// Purpose: Reject malformed ids at construction boundaries.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Track ids are caller-supplied strings; the contract requires every dataset
//! module to reject malformed ids with an invalid-argument error at Track
//! construction. [`TrackId`] centralizes that syntactic check: ids are
//! non-empty ASCII strings limited to alphanumerics plus `-`, `_`, and `.`.
//! [`RemoteKey`] names one downloadable asset within a dataset's remote set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::DatasetError;

// ============================================================================
// SECTION: Track Identifier
// ============================================================================

/// Validated track identifier.
///
/// # Invariants
/// - Non-empty, ASCII alphanumerics plus `-`, `_`, `.` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackId(String);

impl TrackId {
    /// Parses a raw string into a validated track id.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidTrackId`] when the id is empty or
    /// contains disallowed characters.
    pub fn parse(raw: &str) -> Result<Self, DatasetError> {
        if raw.is_empty() {
            return Err(DatasetError::InvalidTrackId {
                track_id: raw.to_string(),
                reason: "track id must not be empty".to_string(),
            });
        }
        if let Some(bad) = raw.chars().find(|c| !is_allowed_id_char(*c)) {
            return Err(DatasetError::InvalidTrackId {
                track_id: raw.to_string(),
                reason: format!("disallowed character `{bad}`"),
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for TrackId {
    type Error = DatasetError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<TrackId> for String {
    fn from(id: TrackId) -> Self {
        id.0
    }
}

/// Returns true for characters permitted in track ids.
const fn is_allowed_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

// ============================================================================
// SECTION: Remote Key
// ============================================================================

/// Logical key naming one remote file within a dataset's remote set.
///
/// # Invariants
/// - Keys are unique within a [`crate::remote::RemoteSet`] by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteKey(String);

impl RemoteKey {
    /// Creates a remote key from any string-like value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
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

    #[test]
    fn accepts_ids_from_shipped_datasets() {
        for raw in [
            "0111",
            "RM-C003",
            "03_BN3-119-G_solo",
            "d07b1fc0-567d-52c2-fef4-239f31c9d40e",
            "MusicDelta_Beethoven",
            "Fl-ord-C4-mf-N-T14d",
            "Beethoven-S3-I-ex1.mel",
        ] {
            let id = TrackId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "~faketrackid~?!", "a b", "slash/id", "tilde~"] {
            let err = TrackId::parse(raw).unwrap_err();
            assert!(err.is_invalid_track_id(), "expected InvalidTrackId for {raw:?}");
        }
    }
}
