// src/extractors/entity.rs

// --- Imports ---
use crate::extractors::age::AgeExtractor;
use crate::extractors::duration::DurationExtractor;
use crate::extractors::gender::{Gender, GenderExtractor};
use crate::extractors::patterns::normalize;
use crate::extractors::symptoms::SymptomExtractor;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// --- Shared Instance (Lazy Static) ---
// The tables are static and known-good; a failure here is a programming error.
static SHARED_EXTRACTOR: Lazy<MedicalEntityExtractor> = Lazy::new(|| {
    MedicalEntityExtractor::new().expect("Failed to compile built-in entity patterns")
});

// --- Data Structures ---
/// Structured fields pulled from one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub symptoms: Vec<String>,
    pub duration: Option<String>,
}

impl ExtractionResult {
    /// The record returned for absent or non-text input.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

// --- Main Extractor Structure ---
/// Runs the four field extractors over one normalized transcript.
///
/// Holds only compiled, read-only tables, so one instance can serve any number
/// of threads without locking.
#[derive(Debug)]
pub struct MedicalEntityExtractor {
    age: AgeExtractor,
    gender: GenderExtractor,
    symptoms: SymptomExtractor,
    duration: DurationExtractor,
}

impl MedicalEntityExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            age: AgeExtractor::new()?,
            gender: GenderExtractor::new()?,
            symptoms: SymptomExtractor::new()?,
            duration: DurationExtractor::new()?,
        })
    }

    /// Process-wide instance built on first use.
    pub fn shared() -> &'static Self {
        &SHARED_EXTRACTOR
    }

    /// Absent input yields the all-empty record; this never fails.
    pub fn extract_entities(&self, transcript: Option<&str>) -> ExtractionResult {
        match transcript {
            Some(text) if !text.is_empty() => self.extract_text(text),
            _ => {
                tracing::debug!("Empty or absent transcript, returning empty extraction");
                ExtractionResult::empty()
            }
        }
    }

    /// Accepts any JSON value; only strings are treated as transcripts.
    pub fn extract_from_value(&self, value: &serde_json::Value) -> ExtractionResult {
        match value.as_str() {
            Some(text) => self.extract_entities(Some(text)),
            None => {
                tracing::debug!(
                    "Transcript value is not text ({}), returning empty extraction",
                    value_kind(value)
                );
                ExtractionResult::empty()
            }
        }
    }

    pub fn extract_text(&self, transcript: &str) -> ExtractionResult {
        let normalized = normalize(transcript);

        let result = ExtractionResult {
            age: self.age.extract(&normalized),
            gender: self.gender.extract(&normalized),
            symptoms: self.symptoms.extract(&normalized),
            duration: self.duration.extract(&normalized),
        };

        tracing::debug!(
            "Extracted age={:?} gender={:?} symptoms={} duration={:?}",
            result.age,
            result.gender,
            result.symptoms.len(),
            result.duration
        );
        result
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Convenience wrapper over the shared extractor.
pub fn extract_medical_entities(transcript: &str) -> ExtractionResult {
    MedicalEntityExtractor::shared().extract_text(transcript)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_complaint() {
        let result = extract_medical_entities(
            "I am a 45-year-old male with chest pain and fever for the last 3 days",
        );
        assert_eq!(
            result,
            ExtractionResult {
                age: Some(45),
                gender: Some(Gender::Male),
                symptoms: vec!["fever".to_string(), "chest pain".to_string()],
                duration: Some("3 days".to_string()),
            }
        );
    }

    #[test]
    fn pronoun_only_complaint() {
        let result = extract_medical_entities("She has had a headache since yesterday");
        assert_eq!(result.age, None);
        assert_eq!(result.gender, Some(Gender::Female));
        assert_eq!(result.symptoms, vec!["headache"]);
        assert_eq!(result.duration.as_deref(), Some("yesterday"));
    }

    #[test]
    fn empty_and_absent_inputs() {
        let extractor = MedicalEntityExtractor::shared();
        assert!(extractor.extract_entities(Some("")).is_empty());
        assert!(extractor.extract_entities(None).is_empty());
        assert!(extract_medical_entities("").is_empty());
    }

    #[test]
    fn non_text_values_yield_empty_record() {
        let extractor = MedicalEntityExtractor::shared();
        let non_text = [
            json!(null),
            json!(42),
            json!(true),
            json!(["fever"]),
            json!({"text": "fever"}),
        ];
        for value in non_text {
            assert_eq!(
                extractor.extract_from_value(&value),
                ExtractionResult::empty(),
                "{value}"
            );
        }
        let result = extractor.extract_from_value(&json!("a 30 year old woman with a rash"));
        assert_eq!(result.age, Some(30));
        assert_eq!(result.gender, Some(Gender::Female));
        assert_eq!(result.symptoms, vec!["rash"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = MedicalEntityExtractor::new().unwrap();
        let text = "The gentleman's wife said she is fine but he has a fever for 2 weeks";
        let first = extractor.extract_text(text);
        let second = extractor.extract_text(text);
        assert_eq!(first, second);
        assert_eq!(first.gender, Some(Gender::Male));
    }

    #[test]
    fn fields_resolve_independently() {
        let result = extract_medical_entities("nausea and dizziness");
        assert_eq!(result.age, None);
        assert_eq!(result.gender, None);
        assert_eq!(result.symptoms, vec!["nausea", "dizziness"]);
        assert_eq!(result.duration, None);
    }

    #[test]
    fn serializes_with_nulls() {
        let value = serde_json::to_value(ExtractionResult::empty()).unwrap();
        assert_eq!(
            value,
            json!({"age": null, "gender": null, "symptoms": [], "duration": null})
        );
    }

    #[test]
    fn shared_instance_is_safe_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                std::thread::spawn(move || {
                    extract_medical_entities(&format!("I'm {} and have a cough", 20 + n))
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            let result = handle.join().unwrap();
            assert_eq!(result.age, Some(20 + n as u8));
            assert_eq!(result.symptoms, vec!["cough"]);
        }
    }
}
