// crates/melodata-core/src/lib.rs
// ============================================================================
// Module: Melodata Core
// Description: Identifiers, annotation types, and contract interfaces for
//              MIR dataset modules.
// Purpose: Define the uniform API surface every dataset module satisfies.
// Dependencies: serde, serde_json, jsonschema, thiserror
// ============================================================================

//! ## Overview
//! Melodata gives MIR research datasets a uniform access layer: every dataset
//! module exposes the same metadata, download, validation, and per-track
//! loading surface. This crate defines that surface — the [`DatasetModule`]
//! and [`Track`] traits, validated identifiers, structured annotation types,
//! the embedded track-index model, the download surface derived from declared
//! remotes, and the JAMS annotation-exchange document model.
//!
//! Implementations live in `melodata-datasets`; transfer and checksum
//! machinery lives in `melodata-download`; the conformance checker that holds
//! every module to this contract lives in `melodata-contract`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod annotations;
pub mod config;
pub mod dataset;
pub mod download;
pub mod error;
pub mod identifiers;
pub mod index;
pub mod jams;
pub mod remote;
pub mod track;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use annotations::AnnotationError;
pub use annotations::BeatData;
pub use annotations::ChordData;
pub use annotations::F0Data;
pub use annotations::Interval;
pub use annotations::KeyData;
pub use annotations::NoteData;
pub use annotations::SectionData;
pub use config::DATA_HOME_ENV;
pub use config::default_data_home;
pub use config::resolve_data_home;
pub use dataset::DatasetModule;
pub use dataset::LoaderArgs;
pub use dataset::LoaderSpec;
pub use dataset::ValidationReport;
pub use dataset::ValidationReporting;
pub use download::DownloadError;
pub use download::DownloadOptions;
pub use download::DownloadSurface;
pub use download::RemoteCardinality;
pub use download::RemoteFetcher;
pub use error::DatasetError;
pub use identifiers::RemoteKey;
pub use identifiers::TrackId;
pub use index::IndexEntry;
pub use index::TrackIndex;
pub use jams::JamsAnnotation;
pub use jams::JamsDocument;
pub use jams::JamsFileMetadata;
pub use jams::JamsObservation;
pub use remote::ArchiveKind;
pub use remote::RemoteFile;
pub use remote::RemoteSet;
pub use track::Track;
