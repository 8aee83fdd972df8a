// crates/melodata-contract/src/lib.rs
// ============================================================================
// Module: Melodata Contract
// Description: Conformance checker holding dataset modules to the uniform
//              API contract.
// Purpose: Exercise every module operation the same way and surface
//          violations as typed errors.
// Dependencies: melodata-core, melodata-download, thiserror
// ============================================================================

//! ## Overview
//! Every dataset module promises the same behavior: a citation, a download
//! surface that matches its remotes, validation that reports findings instead
//! of failing, a track listing consistent with `load`, Track construction
//! that binds the data-home verbatim and rejects bad ids, schema-valid JAMS
//! export, and loaders that reject nonexistent paths with an I/O error.
//! [`ConformanceChecker`] runs those checks against any
//! [`melodata_core::DatasetModule`]; the test suite runs it over the builtin
//! registry with a fixture data-home.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod checker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use checker::ConformanceChecker;
pub use checker::ContractViolation;
