// crates/melodata-download/src/validator.rs
// ============================================================================
// Module: Index Validator
// Description: Compare local files against an embedded dataset index.
// Purpose: Back every module's validate operation with one implementation.
// Dependencies: melodata-core, crate::checksum
// ============================================================================

//! ## Overview
//! Validation walks the dataset index and classifies every indexed file as
//! present-and-matching, missing, or checksum-mismatching. Findings are
//! collected into a [`ValidationReport`] and optionally written one line per
//! finding to the caller's sink; they are never surfaced as errors, so
//! validation against an empty default data-home completes cleanly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;

use melodata_core::DatasetError;
use melodata_core::TrackIndex;
use melodata_core::ValidationReport;
use melodata_core::ValidationReporting;

use crate::checksum::sha256_hex;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates the files indexed for one dataset against a data-home.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] when an existing file cannot be read and
/// [`DatasetError::ReportSink`] when the verbose sink cannot be written.
/// Missing files and mismatches are findings in the report, not errors.
pub fn validate_index(
    index: &TrackIndex,
    data_home: &Path,
    mut reporting: ValidationReporting<'_>,
) -> Result<ValidationReport, DatasetError> {
    let mut report = ValidationReport::default();
    for (track_id, files) in index.iter() {
        for entry in files.values() {
            let local = data_home.join(&entry.path);
            if !local.is_file() {
                report
                    .missing_files
                    .entry(track_id.as_str().to_string())
                    .or_default()
                    .push(entry.path.clone());
                emit(&mut reporting, &format!("missing file: {}", local.display()))?;
                continue;
            }
            let Some(expected) = &entry.checksum else {
                continue;
            };
            let actual = sha256_hex(&local).map_err(|source| DatasetError::Io {
                path: local.clone(),
                source,
            })?;
            if &actual != expected {
                report
                    .invalid_checksums
                    .entry(track_id.as_str().to_string())
                    .or_default()
                    .push(entry.path.clone());
                emit(&mut reporting, &format!("checksum mismatch: {}", local.display()))?;
            }
        }
    }
    Ok(report)
}

/// Writes one finding line unless reporting is silenced.
fn emit(reporting: &mut ValidationReporting<'_>, line: &str) -> Result<(), DatasetError> {
    match reporting {
        ValidationReporting::Silent => Ok(()),
        ValidationReporting::Verbose(sink) => writeln!(sink, "{line}")
            .map_err(|err| DatasetError::ReportSink(err.to_string())),
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

    use std::fs;

    use super::*;

    /// Builds an index over one present file, one mismatch, and one absentee.
    fn fixture() -> (tempfile::TempDir, TrackIndex) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("annotations")).unwrap();
        fs::write(dir.path().join("annotations/good.lab"), b"0.0 1.0 C:maj\n").unwrap();
        fs::write(dir.path().join("annotations/bad.lab"), b"corrupted\n").unwrap();
        let good_sum = sha256_hex(&dir.path().join("annotations/good.lab")).unwrap();
        let raw = format!(
            r#"{{
                "track_1": {{
                    "chords": {{"path": "annotations/good.lab", "checksum": "{good_sum}"}},
                    "beats": {{"path": "annotations/bad.lab", "checksum": "{good_sum}"}}
                }},
                "track_2": {{
                    "chords": {{"path": "annotations/absent.lab", "checksum": null}}
                }}
            }}"#
        );
        (dir, TrackIndex::parse(&raw).unwrap())
    }

    #[test]
    fn classifies_missing_and_mismatching_files() {
        let (dir, index) = fixture();
        let report = validate_index(&index, dir.path(), ValidationReporting::Silent).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.missing_files["track_2"], vec!["annotations/absent.lab"]);
        assert_eq!(report.invalid_checksums["track_1"], vec!["annotations/bad.lab"]);
    }

    #[test]
    fn verbose_reporting_writes_one_line_per_finding() {
        let (dir, index) = fixture();
        let mut sink = Vec::new();
        let report =
            validate_index(&index, dir.path(), ValidationReporting::Verbose(&mut sink)).unwrap();
        assert!(!report.is_clean());
        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("missing file"));
        assert!(text.contains("checksum mismatch"));
    }

    #[test]
    fn empty_data_home_reports_everything_missing_without_error() {
        let (_dir, index) = fixture();
        let report = validate_index(
            &index,
            Path::new("definitely/not/a/real/data/home"),
            ValidationReporting::Silent,
        )
        .unwrap();
        assert_eq!(report.missing_files.len(), 2);
        assert!(report.invalid_checksums.is_empty());
    }
}
