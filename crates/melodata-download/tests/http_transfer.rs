// crates/melodata-download/tests/http_transfer.rs
// ============================================================================
// Module: HTTP Transfer Tests
// Description: Exercise the HTTP fetcher and URL probe against a local server.
// Purpose: Verify transfer, checksum, and probe behavior without the internet.
// Dependencies: melodata-download, melodata-core, tiny_http, tempfile
// ============================================================================

//! ## Overview
//! Spins up a loopback `tiny_http` server and checks that the HTTP fetcher
//! downloads and verifies files, honors `force_overwrite`, and that the URL
//! probe classifies success, client-error, and unreachable endpoints.

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

use std::fs;
use std::thread;

use melodata_core::DownloadError;
use melodata_core::RemoteFetcher;
use melodata_core::RemoteFile;
use melodata_download::HttpFetcher;
use melodata_download::HttpFetcherConfig;
use melodata_download::ProbeError;
use melodata_download::UrlProbe;
use melodata_download::UrlProbeConfig;
use melodata_download::sha256_hex;
use tiny_http::Response;
use tiny_http::Server;

/// Body served for every fetchable path.
const BODY: &str = "time,frequency\n0.00,440.0\n";

/// Starts a loopback server answering `/data.csv` with the fixed body and
/// everything else with 404, then returns its base URL.
fn start_server(requests: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    thread::spawn(move || {
        for _ in 0..requests {
            let Ok(request) = server.recv() else {
                return;
            };
            if request.url() == "/data.csv" {
                let _ = request.respond(Response::from_string(BODY));
            } else {
                let _ = request.respond(Response::from_string("gone").with_status_code(404));
            }
        }
    });
    base
}

/// SHA-256 of the served body, computed through the public hashing helper.
fn body_checksum() -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body");
    fs::write(&path, BODY).unwrap();
    sha256_hex(&path).unwrap()
}

#[test]
fn fetch_downloads_and_verifies_checksum() {
    let base = start_server(1);
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&HttpFetcherConfig::default()).unwrap();
    let remote = RemoteFile::new("data.csv", format!("{base}/data.csv"), body_checksum());

    let local = fetcher.fetch(&remote, dir.path(), false).unwrap();
    assert_eq!(local, dir.path().join("data.csv"));
    assert_eq!(fs::read_to_string(&local).unwrap(), BODY);
}

#[test]
fn fetch_rejects_checksum_mismatch() {
    let base = start_server(1);
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&HttpFetcherConfig::default()).unwrap();
    let remote = RemoteFile::new("data.csv", format!("{base}/data.csv"), "00".repeat(32));

    let err = fetcher.fetch(&remote, dir.path(), false).unwrap_err();
    assert!(matches!(err, DownloadError::ChecksumMismatch { .. }));
}

#[test]
fn existing_file_is_kept_unless_forced() {
    let base = start_server(1);
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&HttpFetcherConfig::default()).unwrap();
    let remote = RemoteFile::new("data.csv", format!("{base}/data.csv"), body_checksum());

    fs::write(dir.path().join("data.csv"), "stale").unwrap();
    let kept = fetcher.fetch(&remote, dir.path(), false).unwrap();
    assert_eq!(fs::read_to_string(&kept).unwrap(), "stale");

    let replaced = fetcher.fetch(&remote, dir.path(), true).unwrap();
    assert_eq!(fs::read_to_string(&replaced).unwrap(), BODY);
}

#[test]
fn fetch_surfaces_http_error_status() {
    let base = start_server(1);
    let dir = tempfile::tempdir().unwrap();
    let fetcher = HttpFetcher::new(&HttpFetcherConfig::default()).unwrap();
    let remote = RemoteFile::new("missing.csv", format!("{base}/missing.csv"), "00");

    let err = fetcher.fetch(&remote, dir.path(), false).unwrap_err();
    assert!(matches!(err, DownloadError::Fetch { .. }));
}

#[test]
fn probe_classifies_success_and_error_statuses() {
    let base = start_server(2);
    let probe = UrlProbe::new(&UrlProbeConfig::default()).unwrap();

    probe.check(&format!("{base}/data.csv")).unwrap();
    let err = probe.check(&format!("{base}/missing.csv")).unwrap_err();
    assert!(matches!(err, ProbeError::Status { status: 404, .. }));
}

#[test]
fn probe_reports_unreachable_hosts() {
    let probe = UrlProbe::new(&UrlProbeConfig {
        timeout_ms: 500,
        ..UrlProbeConfig::default()
    })
    .unwrap();
    // reserved TEST-NET-1 address, nothing listens there
    let err = probe.check("http://192.0.2.1:9/file.zip").unwrap_err();
    assert!(matches!(err, ProbeError::Unreachable { .. }));
}
