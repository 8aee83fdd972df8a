// crates/melodata-core/src/jams.rs
// ============================================================================
// Module: JAMS Document Model
// Description: Annotation-exchange JSON documents and schema validation.
// Purpose: Export track annotations in the standard interchange format.
// Dependencies: serde, serde_json, jsonschema
// ============================================================================

//! ## Overview
//! Tracks export their annotations as JAMS documents: file metadata plus a
//! list of namespaced annotations, each a list of `(time, duration, value,
//! confidence)` observations. The interchange schema is bundled with the
//! crate; [`JamsDocument::validate_schema`] compiles it (draft 2020-12) and
//! checks the serialized document against it. Only that validation boolean
//! is normative for the conformance contract; the converter methods cover
//! the annotation types the shipped datasets produce.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::annotations::BeatData;
use crate::annotations::ChordData;
use crate::annotations::F0Data;
use crate::annotations::KeyData;
use crate::annotations::NoteData;
use crate::annotations::SectionData;
use crate::error::DatasetError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bundled annotation-exchange JSON schema.
const JAMS_SCHEMA: &str = include_str!("../resources/jams_schema.json");

/// Interchange format version written into every document.
const JAMS_VERSION: &str = "0.3.4";

// ============================================================================
// SECTION: Document Types
// ============================================================================

/// One time-aligned observation.
///
/// # Invariants
/// - `time` and `duration` are finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JamsObservation {
    /// Observation time in seconds.
    pub time: f64,
    /// Observation duration in seconds.
    pub duration: f64,
    /// Namespace-specific value.
    pub value: Value,
    /// Optional confidence; serialized as `null` when absent.
    pub confidence: Option<f64>,
}

/// Provenance metadata attached to each annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct JamsAnnotationMetadata {
    /// Corpus the annotation belongs to.
    pub corpus: String,
    /// Where the annotation data came from.
    pub data_source: String,
}

/// One namespaced annotation.
///
/// # Invariants
/// - `namespace` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JamsAnnotation {
    /// Annotation namespace (for example `beat`, `chord`).
    pub namespace: String,
    /// Annotation start time in seconds.
    pub time: f64,
    /// Annotation span in seconds, when known.
    pub duration: Option<f64>,
    /// Provenance metadata.
    pub annotation_metadata: JamsAnnotationMetadata,
    /// Observations in time order.
    pub data: Vec<JamsObservation>,
    /// Free-form extras.
    pub sandbox: Value,
}

/// File-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JamsFileMetadata {
    /// Track title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
    /// Release the track appears on.
    pub release: String,
    /// Track duration in seconds.
    pub duration: f64,
    /// External identifiers.
    pub identifiers: Value,
    /// Interchange format version.
    pub jams_version: String,
}

/// A complete annotation-exchange document.
///
/// # Invariants
/// - Serializes to a structure accepted by the bundled schema whenever the
///   constructor and converter methods are used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JamsDocument {
    /// File-level metadata.
    pub file_metadata: JamsFileMetadata,
    /// Namespaced annotations.
    pub annotations: Vec<JamsAnnotation>,
    /// Free-form extras.
    pub sandbox: Value,
}

// ============================================================================
// SECTION: Document Assembly
// ============================================================================

impl JamsDocument {
    /// Creates an empty document with the given track duration.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Jams`] when the duration is negative or not
    /// finite.
    pub fn new(duration: f64) -> Result<Self, DatasetError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(DatasetError::Jams(format!("invalid track duration {duration}")));
        }
        Ok(Self {
            file_metadata: JamsFileMetadata {
                title: String::new(),
                artist: String::new(),
                release: String::new(),
                duration,
                identifiers: Value::Object(Map::new()),
                jams_version: JAMS_VERSION.to_string(),
            },
            annotations: Vec::new(),
            sandbox: Value::Object(Map::new()),
        })
    }

    /// Sets the track title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.file_metadata.title = title.into();
    }

    /// Sets the performing artist.
    pub fn set_artist(&mut self, artist: impl Into<String>) {
        self.file_metadata.artist = artist.into();
    }

    /// Sets the release name.
    pub fn set_release(&mut self, release: impl Into<String>) {
        self.file_metadata.release = release.into();
    }

    /// Returns the shared annotation scaffold for a namespace.
    fn annotation(&self, namespace: &str) -> JamsAnnotation {
        JamsAnnotation {
            namespace: namespace.to_string(),
            time: 0.0,
            duration: Some(self.file_metadata.duration),
            annotation_metadata: JamsAnnotationMetadata::default(),
            data: Vec::new(),
            sandbox: Value::Object(Map::new()),
        }
    }

    /// Appends a `beat` annotation.
    pub fn push_beats(&mut self, beats: &BeatData) {
        let mut annotation = self.annotation("beat");
        for (time, position) in beats.times.iter().zip(&beats.positions) {
            annotation.data.push(JamsObservation {
                time: *time,
                duration: 0.0,
                value: position.map_or(Value::Null, Value::from),
                confidence: None,
            });
        }
        self.annotations.push(annotation);
    }

    /// Appends a `chord` annotation.
    pub fn push_chords(&mut self, chords: &ChordData) {
        let mut annotation = self.annotation("chord");
        for (interval, label) in chords.intervals.iter().zip(&chords.labels) {
            annotation.data.push(JamsObservation {
                time: interval.start,
                duration: interval.duration(),
                value: Value::String(label.clone()),
                confidence: None,
            });
        }
        self.annotations.push(annotation);
    }

    /// Appends a `segment_open` annotation.
    pub fn push_sections(&mut self, sections: &SectionData) {
        let mut annotation = self.annotation("segment_open");
        for (interval, label) in sections.intervals.iter().zip(&sections.labels) {
            annotation.data.push(JamsObservation {
                time: interval.start,
                duration: interval.duration(),
                value: Value::String(label.clone()),
                confidence: None,
            });
        }
        self.annotations.push(annotation);
    }

    /// Appends a `key_mode` annotation.
    pub fn push_key(&mut self, key: &KeyData) {
        let mut annotation = self.annotation("key_mode");
        for (interval, label) in key.intervals.iter().zip(&key.keys) {
            annotation.data.push(JamsObservation {
                time: interval.start,
                duration: interval.duration(),
                value: Value::String(label.clone()),
                confidence: None,
            });
        }
        self.annotations.push(annotation);
    }

    /// Appends a `pitch_contour` annotation from an f0 contour.
    pub fn push_f0(&mut self, f0: &F0Data) {
        let mut annotation = self.annotation("pitch_contour");
        for ((time, frequency), confidence) in
            f0.times.iter().zip(&f0.frequencies).zip(&f0.confidence)
        {
            annotation.data.push(JamsObservation {
                time: *time,
                duration: 0.0,
                value: json!(*frequency),
                confidence: Some(*confidence),
            });
        }
        self.annotations.push(annotation);
    }

    /// Appends a `note_hz` annotation.
    pub fn push_notes(&mut self, notes: &NoteData) {
        let mut annotation = self.annotation("note_hz");
        for ((interval, pitch), confidence) in
            notes.intervals.iter().zip(&notes.notes_hz).zip(&notes.confidence)
        {
            annotation.data.push(JamsObservation {
                time: interval.start,
                duration: interval.duration(),
                value: json!(*pitch),
                confidence: *confidence,
            });
        }
        self.annotations.push(annotation);
    }

    /// Appends a `tag_open` annotation covering the whole track.
    pub fn push_tag(&mut self, tag: &str) {
        let mut annotation = self.annotation("tag_open");
        annotation.data.push(JamsObservation {
            time: 0.0,
            duration: self.file_metadata.duration,
            value: Value::String(tag.to_string()),
            confidence: None,
        });
        self.annotations.push(annotation);
    }

    /// Serializes the document to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Jams`] when serialization fails.
    pub fn to_value(&self) -> Result<Value, DatasetError> {
        serde_json::to_value(self)
            .map_err(|err| DatasetError::Jams(format!("serialization failed: {err}")))
    }

    /// Validates the serialized document against the bundled schema.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Jams`] on schema compilation failure or the
    /// first schema violation.
    pub fn validate_schema(&self) -> Result<(), DatasetError> {
        let schema: Value = serde_json::from_str(JAMS_SCHEMA)
            .map_err(|err| DatasetError::Jams(format!("bundled schema unreadable: {err}")))?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| DatasetError::Jams(format!("schema compilation failed: {err}")))?;
        let value = self.to_value()?;
        if let Some(violation) = validator.iter_errors(&value).next() {
            return Err(DatasetError::Jams(format!("schema violation: {violation}")));
        }
        Ok(())
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
    use crate::annotations::Interval;

    #[test]
    fn empty_document_is_schema_valid() {
        let doc = JamsDocument::new(12.5).unwrap();
        doc.validate_schema().unwrap();
    }

    #[test]
    fn document_with_all_namespaces_is_schema_valid() {
        let mut doc = JamsDocument::new(180.0).unwrap();
        doc.set_title("Please Please Me");
        doc.set_artist("The Beatles");
        doc.push_beats(&BeatData::new(vec![0.5, 1.0], vec![Some(1), Some(2)]).unwrap());
        doc.push_chords(
            &ChordData::new(
                vec![Interval::new(0.0, 1.0).unwrap()],
                vec!["E:maj".to_string()],
            )
            .unwrap(),
        );
        doc.push_sections(
            &SectionData::new(
                vec![Interval::new(0.0, 15.0).unwrap()],
                vec!["verse".to_string()],
            )
            .unwrap(),
        );
        doc.push_key(
            &KeyData::new(vec![Interval::new(0.0, 180.0).unwrap()], vec!["E".to_string()])
                .unwrap(),
        );
        doc.push_f0(&F0Data::new(vec![0.0, 0.01], vec![440.0, 0.0], vec![1.0, 0.0]).unwrap());
        doc.push_notes(
            &NoteData::new(
                vec![Interval::new(0.2, 0.7).unwrap()],
                vec![330.0],
                vec![Some(0.9)],
            )
            .unwrap(),
        );
        doc.push_tag("flute");
        assert_eq!(doc.annotations.len(), 7);
        doc.validate_schema().unwrap();
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert!(JamsDocument::new(-1.0).is_err());
        assert!(JamsDocument::new(f64::NAN).is_err());
    }

    #[test]
    fn hand_built_invalid_value_fails_schema() {
        let mut doc = JamsDocument::new(1.0).unwrap();
        doc.file_metadata.jams_version = String::new();
        assert!(doc.validate_schema().is_err());
    }
}
