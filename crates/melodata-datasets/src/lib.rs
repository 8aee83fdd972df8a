// crates/melodata-datasets/src/lib.rs
// ============================================================================
// Module: Melodata Datasets
// Description: Shipped dataset modules and the dataset registry.
// Purpose: Provide concrete DatasetModule implementations behind one registry.
// Dependencies: melodata-core, melodata-download, serde, serde_json, csv
// ============================================================================

//! ## Overview
//! Each module in this crate wraps one MIR research dataset behind the
//! uniform [`melodata_core::DatasetModule`] surface: an embedded track index,
//! declared remotes, annotation loaders, and a lazily-loading Track type.
//! [`DatasetRegistry::builtin`] registers every shipped module and enforces
//! the registration-time conformance check between each module's declared
//! download surface and the surface derived from its remotes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod beatles;
pub mod guitarset;
pub mod medley_solos_db;
pub mod medleydb_melody;
pub mod orchset;
pub mod registry;
mod support;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use registry::DatasetRegistry;
pub use registry::RegistryError;
