// src/prescription/prompt.rs
use crate::prescription::models::{join_or, Assessment, PatientInfo};

pub const SYSTEM_PROMPT: &str = "You are Clinqo-AI, a medical simulation assistant. \
    You produce clearly-labelled SIMULATED assessments for education and testing only.";

/// Builds the user prompt. Absent fields are spelled out as "unknown" rather
/// than omitted so the model never guesses them.
pub fn build_medical_prompt(patient: &PatientInfo) -> String {
    format!(
        r#"
EDUCATIONAL MEDICAL SIMULATION - NOT FOR REAL USE

Patient Information:
- Age: {age}
- Gender: {gender}
- Symptoms: {symptoms}
- Duration: {duration}
- Medical history: {history}
- Allergies: {allergies}
- Current medications: {current}

Create a SIMULATED medical assessment in this EXACT JSON format:
{{
  "clinical_summary": "Brief assessment of the patient's condition",
  "possible_diagnoses": ["Most likely condition", "Alternative possibility"],
  "confidence_score": 0.75,
  "medications": [
    {{
      "medicine_name": "[SIMULATED] Medicine Name",
      "dosage": "XXmg",
      "frequency": "X times daily",
      "duration": "X days",
      "instructions": "Take with food/water"
    }}
  ],
  "recommended_tests": ["Test 1", "Test 2"],
  "urgent_flags": [],
  "disclaimer": "SIMULATION ONLY - Not for real medical use"
}}

IMPORTANT RULES:
1. Return ONLY valid JSON (no extra text)
2. All medicine names must start with [SIMULATED]
3. Use realistic but clearly marked fake medications
4. Include safety disclaimers
5. Consider age-appropriate recommendations
6. Never suggest anything the patient is allergic to
"#,
        age = patient.age_label(),
        gender = patient.gender_label(),
        symptoms = patient.symptoms_label(),
        duration = patient.duration.as_deref().unwrap_or("unknown"),
        history = join_or(&patient.medical_history, "none reported"),
        allergies = join_or(&patient.allergies, "none reported"),
        current = join_or(&patient.current_medications, "none reported"),
    )
}

/// Pulls an assessment out of free-form model output: a fenced ```json block
/// first, then the outermost braces, then the whole text.
pub fn extract_json_from_response(content: &str) -> Option<Assessment> {
    if let Some(start) = content.find("```json") {
        let body = &content[start + "```json".len()..];
        let end = body.find("```").unwrap_or(body.len());
        return parse_assessment(&body[..end]);
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            return parse_assessment(&content[start..=end]);
        }
    }

    parse_assessment(content)
}

// Parsed to a `Value` first so only malformed JSON or a non-object fails.
// Field shapes are coerced by the lenient deserializers on `Assessment`.
fn parse_assessment(candidate: &str) -> Option<Assessment> {
    let value: serde_json::Value = match serde_json::from_str(candidate.trim()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("JSON parsing failed: {}", e);
            return None;
        }
    };

    let assessment = Assessment::from_value(value);
    if assessment.is_none() {
        tracing::warn!("Model response JSON is not an object");
    }
    assessment
}

/// Placeholder used whenever the endpoint cannot produce an assessment.
pub fn fallback_assessment(patient: &PatientInfo) -> Assessment {
    Assessment {
        clinical_summary: format!(
            "Assessment needed for patient with {}",
            join_or(&patient.symptoms, "general symptoms")
        ),
        possible_diagnoses: vec!["Requires professional medical evaluation".to_string()],
        confidence_score: 0.0,
        medications: Vec::new(),
        recommended_tests: vec!["Complete medical examination".to_string()],
        urgent_flags: vec!["AI system unavailable - seek professional care".to_string()],
        disclaimer: "SYSTEM ERROR - Consult healthcare provider immediately".to_string(),
    }
}
