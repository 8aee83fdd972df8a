// crates/melodata-download/src/probe.rs
// ============================================================================
// Module: URL Existence Probe
// Description: Lightweight HEAD checks against declared remote URLs.
// Purpose: Detect dead dataset links without downloading anything.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! The conformance checker probes every declared remote URL with a single
//! HEAD request. Redirects are not followed; any response with a status
//! below 400 counts as existing, so a redirecting mirror still passes.
//! Connection failures and error statuses are reported as distinct probe
//! errors. Probes are best-effort and never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// URL probe errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe client could not be built.
    #[error("probe client build failed: {0}")]
    Client(String),

    /// The URL could not be reached at all.
    #[error("url `{url}` is unreachable: {reason}")]
    Unreachable {
        /// The probed URL.
        url: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The URL answered with an error status.
    #[error("url `{url}` answered status {status}")]
    Status {
        /// The probed URL.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the URL probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlProbeConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for UrlProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "melodata/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Lightweight URL existence checker.
pub struct UrlProbe {
    /// HTTP client used for HEAD requests.
    client: Client,
}

impl UrlProbe {
    /// Creates a probe with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Client`] when the HTTP client cannot be built.
    pub fn new(config: &UrlProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ProbeError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    /// Checks that a URL answers a HEAD request with a non-error status.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Unreachable`] on transport failure and
    /// [`ProbeError::Status`] on a status of 400 or above.
    pub fn check(&self, url: &str) -> Result<(), ProbeError> {
        let response = self.client.head(url).send().map_err(|err| ProbeError::Unreachable {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ProbeError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(())
    }
}
