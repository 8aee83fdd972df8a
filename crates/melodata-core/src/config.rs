// crates/melodata-core/src/config.rs
// ============================================================================
// Module: Data-Home Configuration
// Description: Resolution of the per-process default dataset directory.
// Purpose: Thread the data-home location explicitly through every call.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Every dataset operation accepts an optional `data_home` path. When the
//! caller supplies one it is used verbatim (no normalization); when absent,
//! the process default applies: the `MELODATA_DATA_HOME` environment variable
//! if set, otherwise `$HOME/mir_datasets`, otherwise the relative path
//! `mir_datasets`. There is no ambient mutable global; the default is
//! re-resolved on each call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::path::Path;
use std::path::PathBuf;

// ============================================================================
// SECTION: Default Resolution
// ============================================================================

/// Environment variable overriding the default data-home directory.
pub const DATA_HOME_ENV: &str = "MELODATA_DATA_HOME";

/// Returns the process default data-home directory.
#[must_use]
pub fn default_data_home() -> PathBuf {
    if let Some(dir) = env::var_os(DATA_HOME_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join("mir_datasets");
    }
    PathBuf::from("mir_datasets")
}

/// Resolves the effective data-home for one dataset.
///
/// A caller-supplied path is returned exactly as given; the default is the
/// process data-home joined with the dataset's directory name.
#[must_use]
pub fn resolve_data_home(data_home: Option<&Path>, dataset_dir: &str) -> PathBuf {
    data_home.map_or_else(|| default_data_home().join(dataset_dir), Path::to_path_buf)
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
    fn explicit_data_home_passes_through_verbatim() {
        let resolved = resolve_data_home(Some(Path::new("casa/de/data")), "Orchset");
        assert_eq!(resolved, PathBuf::from("casa/de/data"));
    }

    #[test]
    fn default_data_home_joins_dataset_dir() {
        let resolved = resolve_data_home(None, "Orchset");
        assert_eq!(resolved, default_data_home().join("Orchset"));
    }
}
