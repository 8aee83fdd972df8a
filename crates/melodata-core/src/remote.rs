// crates/melodata-core/src/remote.rs
// ============================================================================
// Module: Remote File Descriptors
// Description: Immutable descriptors for downloadable dataset assets.
// Purpose: Derive download-time behavior from declared remote files.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A dataset module declares zero or more remote files, each an immutable
//! `{filename, url, checksum}` record keyed by a [`RemoteKey`]. The archive
//! kind is derived from the filename extension; any ZIP or gzip archive in
//! the set means the dataset's download surface accepts the `cleanup` flag.
//! [`RemoteSet`] keeps the declared remotes in a deterministic key order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::RemoteKey;

// ============================================================================
// SECTION: Archive Kind
// ============================================================================

/// Archive format derived from a remote filename.
///
/// # Invariants
/// - Derivation is by extension only; contents are never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// ZIP archive (`.zip`).
    Zip,
    /// Gzip-compressed file, usually a gzip-tar (`.gz`, `.tgz`).
    Gzip,
    /// Uncompressed tarball (`.tar`).
    Tar,
    /// Not an archive.
    Plain,
}

impl ArchiveKind {
    /// Derives the archive kind from a filename.
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Self::Zip
        } else if lower.ends_with(".gz") || lower.ends_with(".tgz") {
            Self::Gzip
        } else if lower.ends_with(".tar") {
            Self::Tar
        } else {
            Self::Plain
        }
    }

    /// Returns true when the kind requires post-download extraction and thus
    /// a `cleanup` flag on the download surface.
    #[must_use]
    pub const fn needs_cleanup(self) -> bool {
        matches!(self, Self::Zip | Self::Gzip)
    }
}

// ============================================================================
// SECTION: Remote File
// ============================================================================

/// Immutable descriptor of one downloadable dataset asset.
///
/// # Invariants
/// - `checksum` is the lowercase hex SHA-256 of the file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Filename the asset is stored under inside the data-home.
    pub filename: String,
    /// Source URL.
    pub url: String,
    /// Expected SHA-256 checksum, lowercase hex.
    pub checksum: String,
}

impl RemoteFile {
    /// Creates a remote-file descriptor.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        url: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            checksum: checksum.into(),
        }
    }

    /// Returns the archive kind derived from the filename.
    #[must_use]
    pub fn archive_kind(&self) -> ArchiveKind {
        ArchiveKind::from_filename(&self.filename)
    }
}

// ============================================================================
// SECTION: Remote Set
// ============================================================================

/// Ordered set of remote files declared by a dataset module.
///
/// # Invariants
/// - Keys are unique; iteration order is deterministic (sorted by key).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteSet {
    /// Remote files keyed by their logical names.
    entries: BTreeMap<RemoteKey, RemoteFile>,
}

impl RemoteSet {
    /// Builds a remote set from key/descriptor pairs.
    ///
    /// Later entries overwrite earlier ones with the same key; shipped
    /// datasets declare distinct literal keys.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (RemoteKey, RemoteFile)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the number of declared remotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no remotes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a remote by key.
    #[must_use]
    pub fn get(&self, key: &RemoteKey) -> Option<&RemoteFile> {
        self.entries.get(key)
    }

    /// Iterates remotes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&RemoteKey, &RemoteFile)> {
        self.entries.iter()
    }

    /// Returns true when any declared filename is a cleanup-requiring archive.
    #[must_use]
    pub fn has_archive(&self) -> bool {
        self.entries.values().any(|remote| remote.archive_kind().needs_cleanup())
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
    fn archive_kind_follows_extension() {
        assert_eq!(ArchiveKind::from_filename("data.zip"), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::from_filename("data.tar.gz"), ArchiveKind::Gzip);
        assert_eq!(ArchiveKind::from_filename("data.TGZ"), ArchiveKind::Gzip);
        assert_eq!(ArchiveKind::from_filename("data.tar"), ArchiveKind::Tar);
        assert_eq!(ArchiveKind::from_filename("metadata.csv"), ArchiveKind::Plain);
        assert!(ArchiveKind::Zip.needs_cleanup());
        assert!(!ArchiveKind::Tar.needs_cleanup());
        assert!(!ArchiveKind::Plain.needs_cleanup());
    }

    #[test]
    fn remote_set_reports_archives_and_order() {
        let set = RemoteSet::from_entries([
            (
                RemoteKey::new("metadata"),
                RemoteFile::new("meta.csv", "https://example.com/meta.csv", "00"),
            ),
            (
                RemoteKey::new("audio"),
                RemoteFile::new("audio.zip", "https://example.com/audio.zip", "11"),
            ),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.has_archive());
        let keys: Vec<&str> = set.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["audio", "metadata"]);
    }
}
