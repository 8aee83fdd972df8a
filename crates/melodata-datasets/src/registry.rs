// crates/melodata-datasets/src/registry.rs
// ============================================================================
// Module: Dataset Registry
// Description: Name-keyed registry of dataset modules with registration-time
//              conformance checks.
// Purpose: Reject modules whose declared download surface disagrees with the
//          surface derived from their remotes.
// Dependencies: melodata-core, thiserror
// ============================================================================

//! ## Overview
//! Dataset modules register here by name. Registration enforces the contract
//! rule that can be checked without touching the filesystem: the module's
//! declared [`DownloadSurface`] must equal the surface derived from its
//! declared remotes. [`DatasetRegistry::builtin`] constructs every shipped
//! module, surfacing embedded-index parse failures before anything is
//! registered; the conformance checker iterates the registry to hold each
//! module to the rest of the contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use melodata_core::DatasetError;
use melodata_core::DatasetModule;
use melodata_core::DownloadSurface;
use thiserror::Error;

use crate::beatles::Beatles;
use crate::guitarset::Guitarset;
use crate::medley_solos_db::MedleySolosDb;
use crate::medleydb_melody::MedleydbMelody;
use crate::orchset::Orchset;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A module with the same name is already registered.
    #[error("dataset module `{name}` is already registered")]
    DuplicateName {
        /// The conflicting module name.
        name: &'static str,
    },

    /// A shipped module's embedded index failed to parse.
    #[error("dataset module `{name}` has an unusable embedded index: {detail}")]
    Index {
        /// Name of the rejected module.
        name: &'static str,
        /// Parse failure description.
        detail: String,
    },

    /// The declared download surface disagrees with the derived one.
    #[error(
        "dataset module `{name}` declares download surface {declared} \
         but its remotes derive {derived}"
    )]
    SurfaceMismatch {
        /// Name of the rejected module.
        name: &'static str,
        /// Surface the module declares.
        declared: DownloadSurface,
        /// Surface derived from the module's remotes.
        derived: DownloadSurface,
    },
}

/// Maps an embedded-index parse failure to its registration error.
fn index_error(name: &'static str) -> impl Fn(DatasetError) -> RegistryError {
    move |err| RegistryError::Index {
        name,
        detail: err.to_string(),
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Name-keyed registry of dataset modules.
///
/// # Invariants
/// - Every registered module's declared download surface equals the surface
///   derived from its remotes.
#[derive(Default)]
pub struct DatasetRegistry {
    /// Registered modules keyed by name.
    modules: BTreeMap<&'static str, Box<dyn DatasetModule>>,
}

impl DatasetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every shipped dataset module.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Index`] when a shipped module's embedded
    /// index fails to parse and [`RegistryError`] when a module fails the
    /// registration-time surface check.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Box::new(Beatles::new().map_err(index_error("beatles"))?))?;
        registry.register(Box::new(Guitarset::new().map_err(index_error("guitarset"))?))?;
        registry.register(Box::new(
            MedleySolosDb::new().map_err(index_error("medley_solos_db"))?,
        ))?;
        registry.register(Box::new(
            MedleydbMelody::new().map_err(index_error("medleydb_melody"))?,
        ))?;
        registry.register(Box::new(Orchset::new().map_err(index_error("orchset"))?))?;
        Ok(registry)
    }

    /// Registers one module, enforcing name uniqueness and the surface check.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] for a reused name and
    /// [`RegistryError::SurfaceMismatch`] when the declared surface disagrees
    /// with the one derived from the module's remotes.
    pub fn register(&mut self, module: Box<dyn DatasetModule>) -> Result<(), RegistryError> {
        let name = module.name();
        if self.modules.contains_key(name) {
            return Err(RegistryError::DuplicateName { name });
        }
        let declared = module.download_surface();
        let derived = DownloadSurface::for_remotes(module.remotes());
        if declared != derived {
            return Err(RegistryError::SurfaceMismatch {
                name,
                declared,
                derived,
            });
        }
        self.modules.insert(name, module);
        Ok(())
    }

    /// Looks up a module by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn DatasetModule> {
        self.modules.get(name).map(Box::as_ref)
    }

    /// Returns the registered module names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.modules.keys().copied().collect()
    }

    /// Iterates modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn DatasetModule)> {
        self.modules.iter().map(|(name, module)| (*name, module.as_ref()))
    }

    /// Returns the number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true when no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
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

    use std::collections::BTreeMap;
    use std::path::Path;

    use melodata_core::DatasetError;
    use melodata_core::DownloadError;
    use melodata_core::DownloadOptions;
    use melodata_core::LoaderSpec;
    use melodata_core::RemoteCardinality;
    use melodata_core::RemoteFetcher;
    use melodata_core::RemoteSet;
    use melodata_core::Track;
    use melodata_core::TrackId;
    use melodata_core::ValidationReport;
    use melodata_core::ValidationReporting;

    use super::*;

    /// Module declaring a surface its (absent) remotes cannot derive.
    struct LyingModule;

    impl DatasetModule for LyingModule {
        fn name(&self) -> &'static str {
            "lying"
        }

        fn dataset_dir(&self) -> &'static str {
            "Lying"
        }

        fn cite(&self) -> &'static str {
            "@misc{lying}"
        }

        fn remotes(&self) -> Option<&RemoteSet> {
            None
        }

        fn download_surface(&self) -> DownloadSurface {
            DownloadSurface {
                cardinality: RemoteCardinality::Multiple,
                has_archive: true,
            }
        }

        fn download(
            &self,
            _options: &DownloadOptions,
            _fetcher: &dyn RemoteFetcher,
        ) -> Result<(), DownloadError> {
            Ok(())
        }

        fn validate(
            &self,
            _data_home: Option<&Path>,
            _reporting: ValidationReporting<'_>,
        ) -> Result<ValidationReport, DatasetError> {
            Ok(ValidationReport::default())
        }

        fn track_ids(&self) -> Vec<TrackId> {
            Vec::new()
        }

        fn load(
            &self,
            _data_home: Option<&Path>,
        ) -> Result<BTreeMap<TrackId, Box<dyn Track>>, DatasetError> {
            Ok(BTreeMap::new())
        }

        fn track(
            &self,
            track_id: &str,
            _data_home: Option<&Path>,
        ) -> Result<Box<dyn Track>, DatasetError> {
            Err(DatasetError::InvalidTrackId {
                track_id: track_id.to_string(),
                reason: "empty module".to_string(),
            })
        }

        fn loaders(&self) -> Vec<LoaderSpec> {
            Vec::new()
        }
    }

    #[test]
    fn builtin_registers_all_shipped_modules() {
        let registry = DatasetRegistry::builtin().unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "beatles",
                "guitarset",
                "medley_solos_db",
                "medleydb_melody",
                "orchset"
            ]
        );
        assert!(registry.get("orchset").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn registration_rejects_surface_mismatches() {
        let mut registry = DatasetRegistry::new();
        let err = registry.register(Box::new(LyingModule)).unwrap_err();
        assert!(matches!(err, RegistryError::SurfaceMismatch { name: "lying", .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn registration_rejects_duplicate_names() {
        let mut registry = DatasetRegistry::new();
        registry.register(Box::new(crate::orchset::Orchset::new().unwrap())).unwrap();
        let err = registry
            .register(Box::new(crate::orchset::Orchset::new().unwrap()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { name: "orchset" }));
        assert_eq!(registry.len(), 1);
    }
}
