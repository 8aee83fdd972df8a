// crates/melodata-download/src/fetcher.rs
// ============================================================================
// Module: Remote Fetchers
// Description: HTTP and no-op implementations of the fetcher interface.
// Purpose: Keep all network and archive side effects behind one trait.
// Dependencies: melodata-core, reqwest, flate2, tar, zip
// ============================================================================

//! ## Overview
//! [`HttpFetcher`] is the production fetcher: it downloads a remote file with
//! a bounded blocking HTTP client, verifies the declared SHA-256 checksum,
//! and extracts ZIP, gzip-tar, and plain tar archives. [`NullFetcher`]
//! performs no I/O at all; the conformance checker substitutes it to exercise
//! every module's download entry point without touching the network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use flate2::read::GzDecoder;
use melodata_core::ArchiveKind;
use melodata_core::DownloadError;
use melodata_core::RemoteFetcher;
use melodata_core::RemoteFile;
use reqwest::blocking::Client;

use crate::checksum::sha256_hex;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP fetcher.
///
/// # Invariants
/// - `timeout_ms` bounds the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            user_agent: "melodata/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: HTTP Fetcher
// ============================================================================

/// Production fetcher downloading over HTTP with checksum verification.
///
/// # Invariants
/// - Existing files are kept unless `force_overwrite` is set.
/// - Every completed download is verified against the declared checksum.
pub struct HttpFetcher {
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpFetcher {
    /// Creates an HTTP fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Fetch`] when the HTTP client cannot be built.
    pub fn new(config: &HttpFetcherConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| DownloadError::Fetch {
                filename: String::new(),
                reason: format!("http client build failed: {err}"),
            })?;
        Ok(Self { client })
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(
        &self,
        remote: &RemoteFile,
        dest_dir: &Path,
        force_overwrite: bool,
    ) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(dest_dir).map_err(|source| DownloadError::Io {
            path: dest_dir.to_path_buf(),
            source,
        })?;
        let dest = dest_dir.join(&remote.filename);
        if dest.is_file() && !force_overwrite {
            return Ok(dest);
        }
        let mut response =
            self.client.get(&remote.url).send().map_err(|err| DownloadError::Fetch {
                filename: remote.filename.clone(),
                reason: format!("request failed: {err}"),
            })?;
        if !response.status().is_success() {
            return Err(DownloadError::Fetch {
                filename: remote.filename.clone(),
                reason: format!("unexpected status {}", response.status()),
            });
        }
        let mut file = File::create(&dest).map_err(|source| DownloadError::Io {
            path: dest.clone(),
            source,
        })?;
        response.copy_to(&mut file).map_err(|err| DownloadError::Fetch {
            filename: remote.filename.clone(),
            reason: format!("body transfer failed: {err}"),
        })?;
        let actual = sha256_hex(&dest).map_err(|source| DownloadError::Io {
            path: dest.clone(),
            source,
        })?;
        if actual != remote.checksum {
            return Err(DownloadError::ChecksumMismatch {
                filename: remote.filename.clone(),
                expected: remote.checksum.clone(),
                actual,
            });
        }
        Ok(dest)
    }

    fn unpack(&self, archive: &Path, dest_dir: &Path, cleanup: bool) -> Result<(), DownloadError> {
        let filename = archive
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        match ArchiveKind::from_filename(filename) {
            ArchiveKind::Zip => unpack_zip(archive, dest_dir)?,
            ArchiveKind::Gzip => unpack_gzip_tar(archive, dest_dir)?,
            ArchiveKind::Tar => unpack_tar(archive, dest_dir)?,
            ArchiveKind::Plain => {
                return Err(DownloadError::Archive {
                    path: archive.to_path_buf(),
                    reason: "not an archive".to_string(),
                });
            }
        }
        if cleanup {
            fs::remove_file(archive).map_err(|source| DownloadError::Io {
                path: archive.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Extraction Helpers
// ============================================================================

/// Extracts a ZIP archive into the destination directory.
fn unpack_zip(archive: &Path, dest_dir: &Path) -> Result<(), DownloadError> {
    let file = File::open(archive).map_err(|source| DownloadError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|err| DownloadError::Archive {
        path: archive.to_path_buf(),
        reason: format!("zip open failed: {err}"),
    })?;
    zip.extract(dest_dir).map_err(|err| DownloadError::Archive {
        path: archive.to_path_buf(),
        reason: format!("zip extraction failed: {err}"),
    })
}

/// Extracts a gzip-compressed tarball into the destination directory.
fn unpack_gzip_tar(archive: &Path, dest_dir: &Path) -> Result<(), DownloadError> {
    let file = File::open(archive).map_err(|source| DownloadError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));
    tarball.unpack(dest_dir).map_err(|err| DownloadError::Archive {
        path: archive.to_path_buf(),
        reason: format!("gzip-tar extraction failed: {err}"),
    })
}

/// Extracts an uncompressed tarball into the destination directory.
fn unpack_tar(archive: &Path, dest_dir: &Path) -> Result<(), DownloadError> {
    let file = File::open(archive).map_err(|source| DownloadError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut tarball = tar::Archive::new(file);
    tarball.unpack(dest_dir).map_err(|err| DownloadError::Archive {
        path: archive.to_path_buf(),
        reason: format!("tar extraction failed: {err}"),
    })
}

// ============================================================================
// SECTION: No-op Fetcher
// ============================================================================

/// Fetcher stand-in performing no network or filesystem effects.
///
/// # Invariants
/// - `fetch` reports the would-be destination without creating it.
/// - `unpack` succeeds without touching the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFetcher;

impl RemoteFetcher for NullFetcher {
    fn fetch(
        &self,
        remote: &RemoteFile,
        dest_dir: &Path,
        _force_overwrite: bool,
    ) -> Result<PathBuf, DownloadError> {
        Ok(dest_dir.join(&remote.filename))
    }

    fn unpack(
        &self,
        _archive: &Path,
        _dest_dir: &Path,
        _cleanup: bool,
    ) -> Result<(), DownloadError> {
        Ok(())
    }
}
