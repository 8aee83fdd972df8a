// crates/melodata-contract/tests/conformance.rs
// ============================================================================
// Module: Conformance Tests
// Description: Run the contract checker over every builtin dataset module.
// Purpose: Hold the shipped modules to the uniform API contract.
// Dependencies: melodata-contract, melodata-core, melodata-datasets,
//               melodata-download
// ============================================================================

//! ## Overview
//! The fixture tree under `tests/resources/mir_datasets/` holds one small but
//! complete data-home per shipped dataset, with index checksums computed from
//! the fixture files themselves. The offline contract runs against it; the
//! remote-URL reachability check is ignored by default because it touches the
//! network.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;
use std::path::Path;

use melodata_contract::ConformanceChecker;
use melodata_core::ValidationReporting;
use melodata_datasets::DatasetRegistry;
use melodata_download::UrlProbe;
use melodata_download::UrlProbeConfig;

/// Root of the per-dataset fixture data-homes.
const FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources/mir_datasets");

/// Builds the checker bound to the fixture tree.
fn checker() -> ConformanceChecker {
    ConformanceChecker::with_fixture_root(FIXTURE_ROOT)
}

#[test]
fn every_builtin_module_passes_the_offline_contract() {
    let registry = DatasetRegistry::builtin().unwrap();
    assert_eq!(registry.len(), 5);
    let checker = checker();
    for (name, module) in registry.iter() {
        checker.check_module(module).unwrap_or_else(|err| panic!("{name}: {err}"));
    }
}

#[test]
fn fixture_validation_is_clean_for_every_module() {
    let registry = DatasetRegistry::builtin().unwrap();
    for (name, module) in registry.iter() {
        let home = Path::new(FIXTURE_ROOT).join(module.dataset_dir());
        let report = module.validate(Some(&home), ValidationReporting::Silent).unwrap();
        assert!(report.is_clean(), "{name}: fixture validation found problems");
    }
}

#[test]
fn validation_reports_missing_files_instead_of_failing() {
    let registry = DatasetRegistry::builtin().unwrap();
    let empty = tempfile::tempdir().unwrap();
    for (name, module) in registry.iter() {
        // the default data-home may or may not hold data; validate must not error
        module
            .validate(None, ValidationReporting::Silent)
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        let report = module.validate(Some(empty.path()), ValidationReporting::Silent).unwrap();
        assert!(
            !report.missing_files.is_empty(),
            "{name}: an empty data-home should report missing files"
        );
    }
}

#[test]
fn fixture_tracks_export_schema_valid_jams() {
    let registry = DatasetRegistry::builtin().unwrap();
    for (name, module) in registry.iter() {
        let home = Path::new(FIXTURE_ROOT).join(module.dataset_dir());
        for id in module.track_ids() {
            let track = module.track(id.as_str(), Some(&home)).unwrap();
            let jams = track.to_jams().unwrap_or_else(|err| panic!("{name}/{id}: {err}"));
            jams.validate_schema().unwrap_or_else(|err| panic!("{name}/{id}: {err}"));
            assert!(!format!("{track}").is_empty());
        }
    }
}

#[test]
fn verbose_validation_writes_one_line_per_finding() {
    let registry = DatasetRegistry::builtin().unwrap();
    let module = registry.get("orchset").unwrap();
    let empty = tempfile::tempdir().unwrap();
    let mut sink = Vec::new();
    let report = module
        .validate(Some(empty.path()), ValidationReporting::Verbose(&mut sink))
        .unwrap();
    let findings: usize = report.missing_files.values().map(Vec::len).sum();
    let lines = String::from_utf8(sink).unwrap();
    assert_eq!(lines.lines().count(), findings);
    assert!(findings > 0);
}

#[test]
#[ignore = "touches the network"]
fn remote_urls_are_reachable() {
    let registry = DatasetRegistry::builtin().unwrap();
    let probe = UrlProbe::new(&UrlProbeConfig::default()).unwrap();
    let known_issues: BTreeSet<(&str, &str)> = BTreeSet::new();
    let checker = checker();
    for (name, module) in registry.iter() {
        checker
            .check_remote_urls(module, &probe, &known_issues)
            .unwrap_or_else(|err| panic!("{name}: {err}"));
    }
}
