// crates/melodata-core/src/annotations.rs
// ============================================================================
// Module: Annotation Data Types
// Description: Structured in-memory annotation records parsed from files.
// Purpose: Give every loader a validated, format-independent target type.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Loaders parse annotation files (beats, chords, sections, melodies, notes,
//! keys) into the structured records defined here. Constructors validate the
//! invariants shared by all formats: parallel columns stay aligned, times are
//! non-negative, and intervals do not end before they start. Loaders attach
//! file context by wrapping [`AnnotationError`] into
//! [`crate::error::DatasetError::Annotation`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Annotation construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Parallel columns have different lengths.
    #[error("misaligned annotation columns: {left_name} has {left_len}, {right_name} has {right_len}")]
    MisalignedLengths {
        /// Name of the first column.
        left_name: &'static str,
        /// Length of the first column.
        left_len: usize,
        /// Name of the second column.
        right_name: &'static str,
        /// Length of the second column.
        right_len: usize,
    },

    /// A time value is negative or not finite.
    #[error("invalid time value: {value}")]
    InvalidTime {
        /// The offending time value.
        value: f64,
    },

    /// An interval ends before it starts.
    #[error("interval ends before it starts: [{start}, {end}]")]
    InvertedInterval {
        /// Interval start time in seconds.
        start: f64,
        /// Interval end time in seconds.
        end: f64,
    },

    /// A value is outside its documented range.
    #[error("value out of range: {reason}")]
    OutOfRange {
        /// Why the value was rejected.
        reason: String,
    },
}

/// Checks that two parallel columns have equal lengths.
fn check_aligned(
    left_name: &'static str,
    left_len: usize,
    right_name: &'static str,
    right_len: usize,
) -> Result<(), AnnotationError> {
    if left_len == right_len {
        return Ok(());
    }
    Err(AnnotationError::MisalignedLengths {
        left_name,
        left_len,
        right_name,
        right_len,
    })
}

/// Checks that a time value is finite and non-negative.
fn check_time(value: f64) -> Result<(), AnnotationError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(AnnotationError::InvalidTime { value })
}

// ============================================================================
// SECTION: Interval
// ============================================================================

/// Closed time interval in seconds.
///
/// # Invariants
/// - `0 <= start <= end`, both finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Interval start time in seconds.
    pub start: f64,
    /// Interval end time in seconds.
    pub end: f64,
}

impl Interval {
    /// Creates a validated interval.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] when a bound is negative, not finite, or
    /// the interval is inverted.
    pub fn new(start: f64, end: f64) -> Result<Self, AnnotationError> {
        check_time(start)?;
        check_time(end)?;
        if end < start {
            return Err(AnnotationError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the interval duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

// ============================================================================
// SECTION: Beat Annotations
// ============================================================================

/// Beat times with optional metrical positions.
///
/// # Invariants
/// - `times` and `positions` are aligned.
/// - All times are finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatData {
    /// Beat times in seconds.
    pub times: Vec<f64>,
    /// One-based beat position within the bar, when annotated.
    pub positions: Vec<Option<u32>>,
}

impl BeatData {
    /// Creates validated beat data.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] on misaligned columns or invalid times.
    pub fn new(times: Vec<f64>, positions: Vec<Option<u32>>) -> Result<Self, AnnotationError> {
        check_aligned("times", times.len(), "positions", positions.len())?;
        for time in &times {
            check_time(*time)?;
        }
        Ok(Self { times, positions })
    }
}

// ============================================================================
// SECTION: Labeled Interval Annotations
// ============================================================================

/// Labeled section boundaries.
///
/// # Invariants
/// - `intervals` and `labels` are aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionData {
    /// Section intervals.
    pub intervals: Vec<Interval>,
    /// Section labels (for example `verse`, `refrain`).
    pub labels: Vec<String>,
}

impl SectionData {
    /// Creates validated section data.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] on misaligned columns.
    pub fn new(intervals: Vec<Interval>, labels: Vec<String>) -> Result<Self, AnnotationError> {
        check_aligned("intervals", intervals.len(), "labels", labels.len())?;
        Ok(Self { intervals, labels })
    }
}

/// Chord labels over time intervals.
///
/// # Invariants
/// - `intervals` and `labels` are aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordData {
    /// Chord intervals.
    pub intervals: Vec<Interval>,
    /// Chord labels in Harte syntax (for example `C:maj`).
    pub labels: Vec<String>,
}

impl ChordData {
    /// Creates validated chord data.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] on misaligned columns.
    pub fn new(intervals: Vec<Interval>, labels: Vec<String>) -> Result<Self, AnnotationError> {
        check_aligned("intervals", intervals.len(), "labels", labels.len())?;
        Ok(Self { intervals, labels })
    }
}

/// Key labels over time intervals.
///
/// # Invariants
/// - `intervals` and `keys` are aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyData {
    /// Key intervals.
    pub intervals: Vec<Interval>,
    /// Key labels (for example `E:minor`).
    pub keys: Vec<String>,
}

impl KeyData {
    /// Creates validated key data.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] on misaligned columns.
    pub fn new(intervals: Vec<Interval>, keys: Vec<String>) -> Result<Self, AnnotationError> {
        check_aligned("intervals", intervals.len(), "keys", keys.len())?;
        Ok(Self { intervals, keys })
    }
}

// ============================================================================
// SECTION: Pitch Annotations
// ============================================================================

/// Fundamental-frequency (melody) contour sampled over time.
///
/// # Invariants
/// - `times`, `frequencies`, and `confidence` are aligned.
/// - Times are finite and non-negative; unvoiced frames carry frequency 0.
#[derive(Debug, Clone, PartialEq)]
pub struct F0Data {
    /// Sample times in seconds.
    pub times: Vec<f64>,
    /// Fundamental frequency in Hz, 0 for unvoiced frames.
    pub frequencies: Vec<f64>,
    /// Per-frame voicing confidence in `[0, 1]`.
    pub confidence: Vec<f64>,
}

impl F0Data {
    /// Creates validated f0 data.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] on misaligned columns, invalid times, or
    /// confidence values outside `[0, 1]`.
    pub fn new(
        times: Vec<f64>,
        frequencies: Vec<f64>,
        confidence: Vec<f64>,
    ) -> Result<Self, AnnotationError> {
        check_aligned("times", times.len(), "frequencies", frequencies.len())?;
        check_aligned("times", times.len(), "confidence", confidence.len())?;
        for time in &times {
            check_time(*time)?;
        }
        for value in &confidence {
            if !value.is_finite() || *value < 0.0 || *value > 1.0 {
                return Err(AnnotationError::OutOfRange {
                    reason: format!("confidence {value} outside [0, 1]"),
                });
            }
        }
        Ok(Self {
            times,
            frequencies,
            confidence,
        })
    }
}

/// Note events with pitch and optional confidence.
///
/// # Invariants
/// - `intervals`, `notes_hz`, and `confidence` are aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteData {
    /// Note onset/offset intervals.
    pub intervals: Vec<Interval>,
    /// Note pitches in Hz.
    pub notes_hz: Vec<f64>,
    /// Per-note confidence in `[0, 1]`, when annotated.
    pub confidence: Vec<Option<f64>>,
}

impl NoteData {
    /// Creates validated note data.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] on misaligned columns.
    pub fn new(
        intervals: Vec<Interval>,
        notes_hz: Vec<f64>,
        confidence: Vec<Option<f64>>,
    ) -> Result<Self, AnnotationError> {
        check_aligned("intervals", intervals.len(), "notes_hz", notes_hz.len())?;
        check_aligned("intervals", intervals.len(), "confidence", confidence.len())?;
        Ok(Self {
            intervals,
            notes_hz,
            confidence,
        })
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

    use super::*;

    #[test]
    fn interval_rejects_inversion_and_negative_times() {
        assert!(Interval::new(1.0, 0.5).is_err());
        assert!(Interval::new(-0.1, 0.5).is_err());
        assert!(Interval::new(0.0, f64::NAN).is_err());
        let interval = Interval::new(0.5, 2.0).unwrap();
        assert!((interval.duration() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn beat_data_requires_aligned_columns() {
        let err = BeatData::new(vec![0.5, 1.0], vec![Some(1)]).unwrap_err();
        assert!(matches!(err, AnnotationError::MisalignedLengths { .. }));
        let beats = BeatData::new(vec![0.5, 1.0], vec![Some(1), Some(2)]).unwrap();
        assert_eq!(beats.times.len(), 2);
    }

    #[test]
    fn f0_data_bounds_confidence() {
        let err = F0Data::new(vec![0.0], vec![440.0], vec![1.5]).unwrap_err();
        assert!(matches!(err, AnnotationError::OutOfRange { .. }));
        let f0 = F0Data::new(vec![0.0, 0.01], vec![440.0, 0.0], vec![1.0, 0.0]).unwrap();
        assert_eq!(f0.frequencies.len(), 2);
    }
}
