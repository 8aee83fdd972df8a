// crates/melodata-download/src/downloader.rs
// ============================================================================
// Module: Downloader
// Description: Shared download orchestration for dataset modules.
// Purpose: Apply surface rules, remote selection, extraction, and cleanup
//          uniformly across datasets.
// Dependencies: melodata-core
// ============================================================================

//! ## Overview
//! Dataset modules implement their `download` operation by delegating here.
//! The downloader re-derives the download surface from the declared remotes,
//! rejects options the surface does not accept, resolves the destination
//! data-home, selects remotes (honoring `partial_download`), and runs
//! fetch → unpack → cleanup through the supplied [`RemoteFetcher`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use melodata_core::ArchiveKind;
use melodata_core::DownloadError;
use melodata_core::DownloadOptions;
use melodata_core::DownloadSurface;
use melodata_core::RemoteFetcher;
use melodata_core::RemoteFile;
use melodata_core::RemoteKey;
use melodata_core::RemoteSet;
use melodata_core::resolve_data_home;

// ============================================================================
// SECTION: Downloader
// ============================================================================

/// Download orchestrator bound to one fetcher.
pub struct Downloader<'f> {
    /// Transfer and extraction mechanics.
    fetcher: &'f dyn RemoteFetcher,
}

impl<'f> Downloader<'f> {
    /// Creates a downloader delegating side effects to the given fetcher.
    #[must_use]
    pub const fn new(fetcher: &'f dyn RemoteFetcher) -> Self {
        Self { fetcher }
    }

    /// Runs the download for one dataset.
    ///
    /// A dataset without remotes downloads nothing and succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on unaccepted options, unknown partial
    /// keys, transfer failure, checksum mismatch, or extraction failure.
    pub fn run(
        &self,
        dataset_dir: &str,
        remotes: Option<&RemoteSet>,
        options: &DownloadOptions,
    ) -> Result<(), DownloadError> {
        let surface = DownloadSurface::for_remotes(remotes);
        surface.check_options(options)?;
        let Some(remotes) = remotes.filter(|set| !set.is_empty()) else {
            return Ok(());
        };
        let data_home = resolve_data_home(options.data_home.as_deref(), dataset_dir);
        for remote in select_remotes(remotes, options.partial_download.as_deref())? {
            let local = self.fetcher.fetch(remote, &data_home, options.force_overwrite)?;
            let kind = remote.archive_kind();
            if kind != ArchiveKind::Plain {
                // cleanup applies only to the zip/gzip archives that put it
                // on the download surface
                let cleanup = options.cleanup && kind.needs_cleanup();
                self.fetcher.unpack(&local, &data_home, cleanup)?;
            }
        }
        Ok(())
    }
}

/// Selects the remotes to download, honoring a partial-download key list.
fn select_remotes<'r>(
    remotes: &'r RemoteSet,
    partial: Option<&[RemoteKey]>,
) -> Result<Vec<&'r RemoteFile>, DownloadError> {
    match partial {
        None => Ok(remotes.iter().map(|(_, remote)| remote).collect()),
        Some(keys) => keys
            .iter()
            .map(|key| {
                remotes
                    .get(key)
                    .ok_or_else(|| DownloadError::UnknownRemoteKey { key: key.clone() })
            })
            .collect(),
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

    use std::cell::RefCell;
    use std::path::Path;
    use std::path::PathBuf;

    use melodata_core::RemoteFetcher;

    use super::*;

    /// Test fetcher recording every fetch and unpack call.
    #[derive(Default)]
    struct RecordingFetcher {
        fetched: RefCell<Vec<String>>,
        unpacked: RefCell<Vec<(String, bool)>>,
    }

    impl RemoteFetcher for RecordingFetcher {
        fn fetch(
            &self,
            remote: &RemoteFile,
            dest_dir: &Path,
            _force_overwrite: bool,
        ) -> Result<PathBuf, DownloadError> {
            self.fetched.borrow_mut().push(remote.filename.clone());
            Ok(dest_dir.join(&remote.filename))
        }

        fn unpack(
            &self,
            archive: &Path,
            _dest_dir: &Path,
            cleanup: bool,
        ) -> Result<(), DownloadError> {
            let name = archive
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            self.unpacked.borrow_mut().push((name, cleanup));
            Ok(())
        }
    }

    fn remotes() -> RemoteSet {
        RemoteSet::from_entries([
            (
                RemoteKey::new("annotations"),
                RemoteFile::new("annotations.zip", "https://example.com/a.zip", "aa"),
            ),
            (
                RemoteKey::new("metadata"),
                RemoteFile::new("metadata.csv", "https://example.com/m.csv", "bb"),
            ),
        ])
    }

    #[test]
    fn downloads_everything_without_partial_selection() {
        let fetcher = RecordingFetcher::default();
        let downloader = Downloader::new(&fetcher);
        downloader.run("Fixture", Some(&remotes()), &DownloadOptions::default()).unwrap();
        assert_eq!(
            *fetcher.fetched.borrow(),
            vec!["annotations.zip".to_string(), "metadata.csv".to_string()]
        );
        // only the archive gets unpacked, with cleanup on by default
        assert_eq!(
            *fetcher.unpacked.borrow(),
            vec![("annotations.zip".to_string(), true)]
        );
    }

    #[test]
    fn partial_download_selects_named_remotes_only() {
        let fetcher = RecordingFetcher::default();
        let downloader = Downloader::new(&fetcher);
        let options = DownloadOptions {
            partial_download: Some(vec![RemoteKey::new("metadata")]),
            ..DownloadOptions::default()
        };
        downloader.run("Fixture", Some(&remotes()), &options).unwrap();
        assert_eq!(*fetcher.fetched.borrow(), vec!["metadata.csv".to_string()]);
        assert!(fetcher.unpacked.borrow().is_empty());
    }

    #[test]
    fn unknown_partial_key_is_rejected() {
        let fetcher = RecordingFetcher::default();
        let downloader = Downloader::new(&fetcher);
        let options = DownloadOptions {
            partial_download: Some(vec![RemoteKey::new("nope")]),
            ..DownloadOptions::default()
        };
        let err = downloader.run("Fixture", Some(&remotes()), &options).unwrap_err();
        assert!(matches!(err, DownloadError::UnknownRemoteKey { .. }));
        assert!(fetcher.fetched.borrow().is_empty());
    }

    #[test]
    fn no_remotes_downloads_nothing() {
        let fetcher = RecordingFetcher::default();
        let downloader = Downloader::new(&fetcher);
        downloader.run("Fixture", None, &DownloadOptions::default()).unwrap();
        assert!(fetcher.fetched.borrow().is_empty());
    }

    #[test]
    fn surface_rules_are_enforced_before_any_fetch() {
        let fetcher = RecordingFetcher::default();
        let downloader = Downloader::new(&fetcher);
        let options = DownloadOptions {
            force_overwrite: true,
            ..DownloadOptions::default()
        };
        let err = downloader.run("Fixture", None, &options).unwrap_err();
        assert!(matches!(err, DownloadError::OptionNotAccepted { .. }));
        assert!(fetcher.fetched.borrow().is_empty());
    }

    #[test]
    fn cleanup_false_is_passed_through_to_archives() {
        let fetcher = RecordingFetcher::default();
        let downloader = Downloader::new(&fetcher);
        let options = DownloadOptions {
            cleanup: false,
            ..DownloadOptions::default()
        };
        downloader.run("Fixture", Some(&remotes()), &options).unwrap();
        assert_eq!(
            *fetcher.unpacked.borrow(),
            vec![("annotations.zip".to_string(), false)]
        );
    }
}
