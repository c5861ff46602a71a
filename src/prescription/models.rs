// src/prescription/models.rs
use crate::extractors::{ExtractionResult, Gender};
use serde::{Deserialize, Serialize};

pub const SIMULATED_PREFIX: &str = "[SIMULATED]";

/// Patient record handed to the suggestion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub symptoms: Vec<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub current_medications: Vec<String>,
}

impl PatientInfo {
    pub fn from_extraction(
        entities: &ExtractionResult,
        medical_history: Vec<String>,
        allergies: Vec<String>,
    ) -> Self {
        Self {
            age: entities.age,
            gender: entities.gender,
            symptoms: entities.symptoms.clone(),
            duration: entities.duration.clone(),
            medical_history,
            allergies,
            current_medications: Vec::new(),
        }
    }

    pub fn age_label(&self) -> String {
        self.age.map_or_else(|| "unknown".to_string(), |a| a.to_string())
    }

    pub fn gender_label(&self) -> &'static str {
        self.gender.map_or("unknown", |g| g.as_str())
    }

    pub fn symptoms_label(&self) -> String {
        join_or(&self.symptoms, "none reported")
    }
}

impl From<&ExtractionResult> for PatientInfo {
    fn from(entities: &ExtractionResult) -> Self {
        Self::from_extraction(entities, Vec::new(), Vec::new())
    }
}

pub(crate) fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// A single (simulated) medication line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    #[serde(deserialize_with = "lenient::string")]
    pub medicine_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub dosage: String,
    #[serde(deserialize_with = "lenient::string")]
    pub frequency: String,
    #[serde(deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient::string")]
    pub instructions: String,
}

/// Simulated assessment as returned by the model. Missing keys, `null`s and
/// loosely-typed scalars all fall back to something usable, so any JSON object
/// the model sends becomes an assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assessment {
    #[serde(deserialize_with = "lenient::string")]
    pub clinical_summary: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub possible_diagnoses: Vec<String>,
    #[serde(deserialize_with = "lenient::score")]
    pub confidence_score: f64,
    #[serde(deserialize_with = "lenient::medications")]
    pub medications: Vec<Medication>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub recommended_tests: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub urgent_flags: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub disclaimer: String,
}

/// Field deserializers that go through `serde_json::Value` and never reject a
/// shape they can make sense of.
mod lenient {
    use super::Medication;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_to_string(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_to_string(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
            single => scalar_to_string(single).into_iter().collect(),
        })
    }

    pub fn score<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    pub fn medications<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Medication>, D::Error> {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        };
        Ok(items.into_iter().filter_map(medication).collect())
    }

    fn medication(value: Value) -> Option<Medication> {
        match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            Value::String(name) => Some(Medication {
                medicine_name: name,
                ..Default::default()
            }),
            _ => None,
        }
    }
}

impl Assessment {
    /// Converts any JSON object; anything else is rejected.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Prefixes every medicine name lacking the simulation marker.
    pub fn mark_simulated(mut self) -> Self {
        for med in &mut self.medications {
            if !med.medicine_name.starts_with(SIMULATED_PREFIX) {
                med.medicine_name = format!("{} {}", SIMULATED_PREFIX, med.medicine_name.trim());
            }
        }
        self
    }
}

/// Result of a suggestion attempt. Failures still carry a usable record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuggestionOutcome {
    Success {
        ai_assessment: Assessment,
        timestamp: String, // RFC 3339
    },
    Fallback {
        error: String,
        fallback: Assessment,
        timestamp: String, // RFC 3339
    },
}

impl SuggestionOutcome {
    pub fn assessment(&self) -> &Assessment {
        match self {
            Self::Success { ai_assessment, .. } => ai_assessment,
            Self::Fallback { fallback, .. } => fallback,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_substitute_unknown() {
        let info = PatientInfo::from(&ExtractionResult::empty());
        assert_eq!(info.age_label(), "unknown");
        assert_eq!(info.gender_label(), "unknown");
        assert_eq!(info.symptoms_label(), "none reported");

        let info = PatientInfo {
            age: Some(45),
            gender: Some(Gender::Male),
            symptoms: vec!["fever".into(), "cough".into()],
            ..Default::default()
        };
        assert_eq!(info.age_label(), "45");
        assert_eq!(info.gender_label(), "male");
        assert_eq!(info.symptoms_label(), "fever, cough");
    }

    #[test]
    fn mark_simulated_is_idempotent() {
        let assessment = Assessment {
            medications: vec![
                Medication {
                    medicine_name: "Paracetamol".into(),
                    ..Default::default()
                },
                Medication {
                    medicine_name: "[SIMULATED] Ibuprofen".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
        .mark_simulated()
        .mark_simulated();

        let names: Vec<_> = assessment
            .medications
            .iter()
            .map(|m| m.medicine_name.as_str())
            .collect();
        assert_eq!(names, vec!["[SIMULATED] Paracetamol", "[SIMULATED] Ibuprofen"]);
    }

    #[test]
    fn partial_assessment_json_parses() {
        let raw = r#"{"clinical_summary": "Likely viral", "confidence_score": 0.6}"#;
        let assessment: Assessment = serde_json::from_str(raw).unwrap();
        assert_eq!(assessment.clinical_summary, "Likely viral");
        assert!(assessment.medications.is_empty());
    }

    #[test]
    fn nulls_become_defaults() {
        let value = serde_json::json!({
            "clinical_summary": "Viral",
            "urgent_flags": null,
            "possible_diagnoses": ["Cold", null],
            "medications": null,
            "disclaimer": null,
            "confidence_score": null
        });
        let assessment = Assessment::from_value(value).unwrap();
        assert_eq!(assessment.clinical_summary, "Viral");
        assert!(assessment.urgent_flags.is_empty());
        assert_eq!(assessment.possible_diagnoses, vec!["Cold"]);
        assert!(assessment.medications.is_empty());
        assert_eq!(assessment.disclaimer, "");
        assert_eq!(assessment.confidence_score, 0.0);
    }

    #[test]
    fn loosely_typed_scalars_are_coerced() {
        let value = serde_json::json!({
            "confidence_score": "0.8",
            "recommended_tests": "CBC",
            "medications": [
                {"medicine_name": "[SIMULATED] X", "dosage": 500, "frequency": 2},
                "[SIMULATED] Y",
                42
            ]
        });
        let assessment = Assessment::from_value(value).unwrap();
        assert_eq!(assessment.confidence_score, 0.8);
        assert_eq!(assessment.recommended_tests, vec!["CBC"]);
        assert_eq!(assessment.medications.len(), 2);
        assert_eq!(assessment.medications[0].dosage, "500");
        assert_eq!(assessment.medications[0].frequency, "2");
        assert_eq!(assessment.medications[1].medicine_name, "[SIMULATED] Y");
    }

    #[test]
    fn only_objects_convert() {
        assert!(Assessment::from_value(serde_json::json!([1, 2])).is_none());
        assert!(Assessment::from_value(serde_json::json!("text")).is_none());
        assert!(Assessment::from_value(serde_json::json!({})).is_some());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = SuggestionOutcome::Fallback {
            error: "Request timed out".into(),
            fallback: Assessment::default(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "fallback");
        assert_eq!(value["error"], "Request timed out");
        assert!(!outcome.is_success());
    }
}
