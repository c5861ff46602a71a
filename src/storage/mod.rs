// src/storage/mod.rs
use crate::extractors::ExtractionResult;
use crate::prescription::SuggestionOutcome;
use crate::stt::TranscriptionMetadata;
use crate::utils::error::StorageError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything produced for one complaint, as written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeRecord {
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionMetadata>,
    pub entities: ExtractionResult,
    pub suggestion: Option<SuggestionOutcome>,
    pub processed_at: String,
}

impl IntakeRecord {
    pub fn new(transcript: Option<String>, entities: ExtractionResult) -> Self {
        Self {
            transcript,
            transcription: None,
            entities,
            suggestion: None,
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_transcription(mut self, metadata: TranscriptionMetadata) -> Self {
        self.transcription = Some(metadata);
        self
    }

    pub fn with_suggestion(mut self, suggestion: SuggestionOutcome) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes the record as pretty JSON under `<base>/<YYYYMMDD>/`.
    pub fn save_record(&self, record: &IntakeRecord) -> Result<PathBuf, StorageError> {
        let now = chrono::Utc::now();
        let target_dir = self.base_dir.join(now.format("%Y%m%d").to_string());

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let filename = format!("intake_{}.json", now.format("%H%M%S%3f"));
        let file_path = target_dir.join(filename);

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved intake record to {}", file_path.display());

        Ok(file_path)
    }
}
