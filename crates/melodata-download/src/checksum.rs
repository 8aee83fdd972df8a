// crates/melodata-download/src/checksum.rs
// ============================================================================
// Module: File Checksums
// Description: SHA-256 hashing of local files.
// Purpose: Back index validation and download verification.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Indexes and remote-file descriptors record lowercase hex SHA-256 digests
//! of file bytes. Hashing streams the file through a fixed-size buffer so
//! large audio archives do not load into memory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Hashing
// ============================================================================

/// Read buffer size for streaming hashes.
const HASH_BUF_BYTES: usize = 64 * 1024;

/// Computes the lowercase hex SHA-256 of a file's bytes.
///
/// # Errors
///
/// Returns the underlying [`io::Error`] when the file cannot be read.
pub fn sha256_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0_u8; HASH_BUF_BYTES];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // write! to a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
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

    use std::fs;

    use super::*;

    #[test]
    fn hashes_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello\n").unwrap();
        // sha256 of "hello\n"
        assert_eq!(
            sha256_hex(&path).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(sha256_hex(Path::new("a/fake/filepath")).is_err());
    }
}
