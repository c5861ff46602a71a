// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors (timeouts included)

    #[error("HTTP error {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("API key rejected by the suggestion endpoint")]
    Unauthorized,

    #[error("Suggestion endpoint rate limit exceeded")]
    RateLimited,

    #[error("No choices in response")]
    EmptyChoices,

    #[error("Failed to parse assessment JSON from model output")]
    Parse { raw_content: String },
}

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("File path cannot be empty")]
    EmptyPath,

    #[error("Audio file not found: {0}")]
    NotFound(String),

    #[error("Unsupported file format: {extension}. Supported formats: {supported}")]
    UnsupportedFormat { extension: String, supported: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to transcribe audio file {file}: {reason}")]
    Failed { file: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction setup failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Prescription suggestion failed: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
