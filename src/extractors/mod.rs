// src/extractors/mod.rs
pub mod age;
pub mod duration;
pub mod entity;
pub mod gender;
pub mod patterns;
pub mod symptoms;

// Re-export key extraction types for convenience
pub use age::AgeExtractor;
pub use duration::DurationExtractor;
pub use entity::{extract_medical_entities, ExtractionResult, MedicalEntityExtractor};
pub use gender::{Gender, GenderExtractor};
pub use symptoms::SymptomExtractor;
