// src/prescription/mod.rs
pub mod client;
pub mod models;
pub mod prompt;

pub use client::PrescriptionClient;
pub use models::{Assessment, Medication, PatientInfo, SuggestionOutcome};
pub use prompt::{build_medical_prompt, extract_json_from_response, fallback_assessment};
