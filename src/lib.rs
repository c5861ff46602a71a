// src/lib.rs
pub mod config;
pub mod extractors;
pub mod prescription;
pub mod storage;
pub mod stt;
pub mod utils;

pub use extractors::{extract_medical_entities, ExtractionResult, Gender, MedicalEntityExtractor};
pub use utils::AppError;
