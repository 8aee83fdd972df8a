// crates/melodata-download/src/lib.rs
// ============================================================================
// Module: Melodata Download
// Description: Transfer, checksum, and probe machinery for dataset modules.
// Purpose: Implement the fetcher interface and validation helpers the
//          dataset modules call through.
// Dependencies: melodata-core, reqwest, sha2, flate2, tar, zip
// ============================================================================

//! ## Overview
//! This crate ships the concrete download-side machinery behind the fixed
//! interfaces defined in `melodata-core`: an HTTP [`RemoteFetcher`]
//! implementation with SHA-256 verification and archive extraction, a no-op
//! stand-in used by the conformance checker, the shared downloader that
//! orders fetch/unpack/cleanup per the dataset's download surface, the
//! index-driven checksum validator, and a lightweight URL existence probe.
//!
//! [`RemoteFetcher`]: melodata_core::RemoteFetcher

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod checksum;
pub mod downloader;
pub mod fetcher;
pub mod probe;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use checksum::sha256_hex;
pub use downloader::Downloader;
pub use fetcher::HttpFetcher;
pub use fetcher::HttpFetcherConfig;
pub use fetcher::NullFetcher;
pub use probe::ProbeError;
pub use probe::UrlProbe;
pub use probe::UrlProbeConfig;
pub use validator::validate_index;
