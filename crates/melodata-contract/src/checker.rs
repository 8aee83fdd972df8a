// crates/melodata-contract/src/checker.rs
// ============================================================================
// Module: Conformance Checker
// Description: Uniform checks every dataset module must pass.
// Purpose: Turn the dataset-module contract into executable assertions.
// Dependencies: melodata-core, melodata-download, thiserror
// ============================================================================

//! ## Overview
//! The checker exercises one module at a time. Offline checks cover the
//! citation, the download surface and its option rejection rules, validation
//! against both the default and a fixture data-home, track listing
//! consistency, Track construction shape (data-home binding, Display, JAMS
//! schema validity, bad-id rejection), and loader behavior on nonexistent
//! paths. Remote URL reachability is a separate, network-touching check.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use melodata_core::DatasetModule;
use melodata_core::DownloadError;
use melodata_core::DownloadOptions;
use melodata_core::DownloadSurface;
use melodata_core::LoaderArgs;
use melodata_core::RemoteKey;
use melodata_core::TrackId;
use melodata_core::ValidationReporting;
use melodata_core::default_data_home;
use melodata_download::NullFetcher;
use melodata_download::UrlProbe;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Track id no module may accept: wrong characters, wrong everything.
const MALFORMED_TRACK_ID: &str = "~faketrackid~?!";

/// Path no loader may read: it does not exist.
const FAKE_FILEPATH: &str = "a/fake/filepath";

/// Literal data-home that must pass through Track construction verbatim.
const LITERAL_DATA_HOME: &str = "casa/de/data";

// ============================================================================
// SECTION: Violations
// ============================================================================

/// One way a module can break the contract.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ContractViolation {
    /// The citation is empty or not BibTeX.
    #[error("module `{module}` has an empty or non-bibtex citation")]
    Citation {
        /// Name of the offending module.
        module: String,
    },

    /// The declared download surface disagrees with the derived one.
    #[error("module `{module}` declares surface {declared} but derives {derived}")]
    SurfaceMismatch {
        /// Name of the offending module.
        module: String,
        /// Surface the module declares.
        declared: DownloadSurface,
        /// Surface derived from the module's remotes.
        derived: DownloadSurface,
    },

    /// A download check failed.
    #[error("module `{module}` download check failed: {detail}")]
    Download {
        /// Name of the offending module.
        module: String,
        /// What went wrong.
        detail: String,
    },

    /// A validation check failed.
    #[error("module `{module}` validation check failed: {detail}")]
    Validation {
        /// Name of the offending module.
        module: String,
        /// What went wrong.
        detail: String,
    },

    /// The track listing is inconsistent with `load`.
    #[error("module `{module}` track listing check failed: {detail}")]
    TrackListing {
        /// Name of the offending module.
        module: String,
        /// What went wrong.
        detail: String,
    },

    /// Track construction broke its shape rules.
    #[error("module `{module}` track shape check failed: {detail}")]
    TrackShape {
        /// Name of the offending module.
        module: String,
        /// What went wrong.
        detail: String,
    },

    /// A loader broke its path or argument rules.
    #[error("module `{module}` loader `{loader}` check failed: {detail}")]
    Loader {
        /// Name of the offending module.
        module: String,
        /// Name of the offending loader.
        loader: String,
        /// What went wrong.
        detail: String,
    },

    /// A declared remote URL is unreachable.
    #[error("module `{module}` remote `{url}` check failed: {detail}")]
    RemoteUrl {
        /// Name of the offending module.
        module: String,
        /// The unreachable URL.
        url: String,
        /// What went wrong.
        detail: String,
    },
}

// ============================================================================
// SECTION: Checker
// ============================================================================

/// Runs the contract checks against dataset modules.
#[derive(Debug, Clone, Default)]
pub struct ConformanceChecker {
    /// Root holding one complete data-home per dataset directory, when a
    /// fixture is available.
    fixture_root: Option<PathBuf>,
}

impl ConformanceChecker {
    /// Creates a checker without fixture data; fixture-dependent checks are
    /// skipped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a checker whose fixture root holds one data-home per dataset
    /// directory name.
    #[must_use]
    pub fn with_fixture_root(root: impl Into<PathBuf>) -> Self {
        Self {
            fixture_root: Some(root.into()),
        }
    }

    /// Returns the fixture data-home for one module, when available.
    fn fixture_home(&self, module: &dyn DatasetModule) -> Option<PathBuf> {
        self.fixture_root.as_ref().map(|root| root.join(module.dataset_dir()))
    }

    /// Runs every offline check against one module.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractViolation`] encountered.
    pub fn check_module(&self, module: &dyn DatasetModule) -> Result<(), ContractViolation> {
        self.check_citation(module)?;
        self.check_download_surface(module)?;
        self.check_download(module)?;
        self.check_validation(module)?;
        self.check_track_listing(module)?;
        self.check_track_shape(module)?;
        self.check_loaders(module)?;
        Ok(())
    }

    /// Checks that the module cites its dataset in BibTeX.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::Citation`] on an empty or non-BibTeX
    /// citation.
    pub fn check_citation(&self, module: &dyn DatasetModule) -> Result<(), ContractViolation> {
        let citation = module.cite().trim();
        if citation.is_empty() || !citation.starts_with('@') {
            return Err(ContractViolation::Citation {
                module: module.name().to_string(),
            });
        }
        Ok(())
    }

    /// Checks that the declared download surface equals the derived one.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::SurfaceMismatch`] when they disagree.
    pub fn check_download_surface(
        &self,
        module: &dyn DatasetModule,
    ) -> Result<(), ContractViolation> {
        let declared = module.download_surface();
        let derived = DownloadSurface::for_remotes(module.remotes());
        if declared != derived {
            return Err(ContractViolation::SurfaceMismatch {
                module: module.name().to_string(),
                declared,
                derived,
            });
        }
        Ok(())
    }

    /// Checks default-option downloads succeed and off-surface options are
    /// rejected, without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::Download`] when an accepted call fails or
    /// a rejected option passes.
    pub fn check_download(&self, module: &dyn DatasetModule) -> Result<(), ContractViolation> {
        let violation = |detail: String| ContractViolation::Download {
            module: module.name().to_string(),
            detail,
        };
        let fetcher = NullFetcher;
        module
            .download(&DownloadOptions::default(), &fetcher)
            .map_err(|err| violation(format!("default options failed: {err}")))?;

        let surface = module.download_surface();
        if !surface.accepts_force_overwrite() {
            let options = DownloadOptions {
                force_overwrite: true,
                ..DownloadOptions::default()
            };
            expect_option_rejected(module.download(&options, &fetcher), "force_overwrite")
                .map_err(&violation)?;
        }
        if !surface.accepts_partial_download() {
            let options = DownloadOptions {
                partial_download: Some(vec![RemoteKey::new("anything")]),
                ..DownloadOptions::default()
            };
            expect_option_rejected(module.download(&options, &fetcher), "partial_download")
                .map_err(&violation)?;
        } else {
            let options = DownloadOptions {
                partial_download: Some(vec![RemoteKey::new("no-such-remote")]),
                ..DownloadOptions::default()
            };
            match module.download(&options, &fetcher) {
                Err(DownloadError::UnknownRemoteKey { .. }) => {}
                Ok(()) => {
                    return Err(violation("unknown partial key was accepted".to_string()));
                }
                Err(err) => {
                    return Err(violation(format!(
                        "unknown partial key yielded the wrong error: {err}"
                    )));
                }
            }
        }
        if !surface.accepts_cleanup() {
            let options = DownloadOptions {
                cleanup: false,
                ..DownloadOptions::default()
            };
            expect_option_rejected(module.download(&options, &fetcher), "cleanup")
                .map_err(&violation)?;
        }
        Ok(())
    }

    /// Checks that validation reports findings instead of failing.
    ///
    /// Against the default data-home (usually absent) validation must still
    /// succeed; against a complete fixture the report must be clean.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::Validation`] on a validation error or an
    /// unclean fixture report.
    pub fn check_validation(&self, module: &dyn DatasetModule) -> Result<(), ContractViolation> {
        let violation = |detail: String| ContractViolation::Validation {
            module: module.name().to_string(),
            detail,
        };
        module
            .validate(None, ValidationReporting::Silent)
            .map_err(|err| violation(format!("default data-home validation failed: {err}")))?;

        let Some(fixture) = self.fixture_home(module) else {
            return Ok(());
        };
        let mut sink = Vec::new();
        let report = module
            .validate(Some(&fixture), ValidationReporting::Verbose(&mut sink))
            .map_err(|err| violation(format!("fixture validation failed: {err}")))?;
        if !report.is_clean() {
            return Err(violation(format!(
                "fixture data-home has {} missing and {} mismatching tracks",
                report.missing_files.len(),
                report.invalid_checksums.len()
            )));
        }
        if !sink.is_empty() {
            return Err(violation("clean validation wrote findings".to_string()));
        }
        Ok(())
    }

    /// Checks that `track_ids` is duplicate-free and agrees with `load`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::TrackListing`] on duplicates, an empty
    /// listing, or a `load` key set that differs from the listing.
    pub fn check_track_listing(
        &self,
        module: &dyn DatasetModule,
    ) -> Result<(), ContractViolation> {
        let violation = |detail: String| ContractViolation::TrackListing {
            module: module.name().to_string(),
            detail,
        };
        let ids = module.track_ids();
        if ids.is_empty() {
            return Err(violation("no tracks indexed".to_string()));
        }
        let unique: BTreeSet<&TrackId> = ids.iter().collect();
        if unique.len() != ids.len() {
            return Err(violation("duplicate track ids".to_string()));
        }
        for data_home in [None, self.fixture_home(module)] {
            let loaded = module
                .load(data_home.as_deref())
                .map_err(|err| violation(format!("load failed: {err}")))?;
            if loaded.len() != ids.len() || !ids.iter().all(|id| loaded.contains_key(id)) {
                return Err(violation("load keys differ from track_ids".to_string()));
            }
        }
        Ok(())
    }

    /// Checks Track construction shape on the first listed track.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::TrackShape`] when data-home binding,
    /// Display, JAMS export, or bad-id rejection misbehaves.
    pub fn check_track_shape(&self, module: &dyn DatasetModule) -> Result<(), ContractViolation> {
        let violation = |detail: String| ContractViolation::TrackShape {
            module: module.name().to_string(),
            detail,
        };
        let ids = module.track_ids();
        let Some(id) = ids.first() else {
            return Err(violation("no tracks indexed".to_string()));
        };

        let track = module
            .track(id.as_str(), None)
            .map_err(|err| violation(format!("default construction failed: {err}")))?;
        let expected = default_data_home().join(module.dataset_dir());
        if track.data_home() != expected {
            return Err(violation(format!(
                "default data-home is `{}`, expected `{}`",
                track.data_home().display(),
                expected.display()
            )));
        }
        if format!("{track}").is_empty() {
            return Err(violation("Display rendered nothing".to_string()));
        }

        let literal = module
            .track(id.as_str(), Some(Path::new(LITERAL_DATA_HOME)))
            .map_err(|err| violation(format!("literal construction failed: {err}")))?;
        if literal.data_home() != Path::new(LITERAL_DATA_HOME) {
            return Err(violation("literal data-home was not bound verbatim".to_string()));
        }

        match module.track(MALFORMED_TRACK_ID, None) {
            Err(err) if err.is_invalid_track_id() => {}
            Err(err) => {
                return Err(violation(format!("malformed id yielded the wrong error: {err}")));
            }
            Ok(_) => return Err(violation("malformed id was accepted".to_string())),
        }

        if let Some(fixture) = self.fixture_home(module) {
            let track = module
                .track(id.as_str(), Some(&fixture))
                .map_err(|err| violation(format!("fixture construction failed: {err}")))?;
            let jams = track
                .to_jams()
                .map_err(|err| violation(format!("jams export failed: {err}")))?;
            jams.validate_schema()
                .map_err(|err| violation(format!("jams document is schema-invalid: {err}")))?;
        }
        Ok(())
    }

    /// Checks loader naming and missing-path behavior.
    ///
    /// Every loader, invoked with its required arguments on a nonexistent
    /// path, must fail with an I/O error rather than parse or succeed.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::Loader`] on a misnamed loader or a wrong
    /// missing-path error.
    pub fn check_loaders(&self, module: &dyn DatasetModule) -> Result<(), ContractViolation> {
        for spec in module.loaders() {
            let violation = |detail: String| ContractViolation::Loader {
                module: module.name().to_string(),
                loader: spec.name.to_string(),
                detail,
            };
            if !spec.name.starts_with("load_") {
                return Err(violation("loader name lacks the load_ prefix".to_string()));
            }
            let mut args = LoaderArgs::new();
            for name in spec.required_args {
                args = args.with(*name, 1);
            }
            match spec.invoke(Path::new(FAKE_FILEPATH), &args) {
                Err(err) if err.is_io() => {}
                Err(err) => {
                    return Err(violation(format!(
                        "nonexistent path yielded the wrong error: {err}"
                    )));
                }
                Ok(()) => {
                    return Err(violation("nonexistent path was accepted".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Probes every declared remote URL, skipping known-unreachable remotes.
    ///
    /// Known issues are keyed by `(module name, remote key)`. This check
    /// touches the network and is kept out of [`Self::check_module`].
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::RemoteUrl`] for the first unreachable
    /// remote not listed in `known_issues`.
    pub fn check_remote_urls(
        &self,
        module: &dyn DatasetModule,
        probe: &UrlProbe,
        known_issues: &BTreeSet<(&str, &str)>,
    ) -> Result<(), ContractViolation> {
        let Some(remotes) = module.remotes() else {
            return Ok(());
        };
        for (key, remote) in remotes.iter() {
            if known_issues.contains(&(module.name(), key.as_str())) {
                continue;
            }
            probe.check(&remote.url).map_err(|err| ContractViolation::RemoteUrl {
                module: module.name().to_string(),
                url: remote.url.clone(),
                detail: err.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Maps a download result to an error unless the named option was rejected.
fn expect_option_rejected(
    result: Result<(), DownloadError>,
    option: &str,
) -> Result<(), String> {
    match result {
        Err(DownloadError::OptionNotAccepted { .. }) => Ok(()),
        Ok(()) => Err(format!("off-surface option `{option}` was accepted")),
        Err(err) => Err(format!("off-surface option `{option}` yielded the wrong error: {err}")),
    }
}
