// src/stt/mod.rs
use crate::utils::error::TranscriptionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

pub const SUPPORTED_FORMATS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "wma"];
const LARGE_FILE_WARNING_MB: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum WhisperModel {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl WhisperModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

pub fn available_models() -> Vec<&'static str> {
    [
        WhisperModel::Tiny,
        WhisperModel::Base,
        WhisperModel::Small,
        WhisperModel::Medium,
        WhisperModel::Large,
    ]
    .iter()
    .map(WhisperModel::as_str)
    .collect()
}

/// Checks that `path` names an existing audio file of a supported type.
/// Very large files are allowed but logged.
pub fn validate_audio_path(path: &Path) -> Result<(), TranscriptionError> {
    if path.as_os_str().is_empty() {
        return Err(TranscriptionError::EmptyPath);
    }
    if !path.exists() {
        return Err(TranscriptionError::NotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&extension.as_str()) {
        return Err(TranscriptionError::UnsupportedFormat {
            extension: format!(".{}", extension),
            supported: SUPPORTED_FORMATS.join(", "),
        });
    }

    let size_mb = file_size_mb(path)?;
    if size_mb > LARGE_FILE_WARNING_MB {
        tracing::warn!(
            "Large audio file detected: {:.1}MB. Transcription may take longer.",
            size_mb
        );
    }
    Ok(())
}

fn file_size_mb(path: &Path) -> Result<f64, TranscriptionError> {
    Ok(std::fs::metadata(path)?.len() as f64 / (1024.0 * 1024.0))
}

/// Writes `text` next to the audio file (`visit.wav` -> `visit.txt`) or to
/// `output_file` when given.
pub async fn save_transcript(
    text: &str,
    audio: &Path,
    output_file: Option<&Path>,
) -> Result<PathBuf, TranscriptionError> {
    let target = output_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| audio.with_extension("txt"));

    tokio::fs::write(&target, text).await?;
    tracing::info!("Transcription saved to: {}", target.display());
    Ok(target)
}

/// One timed chunk of a whisper transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Transcript plus what whisper reports about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionMetadata {
    pub text: String,
    pub language: String,
    pub segments: Vec<Segment>,
    pub file_path: String,
    pub model_used: String,
    pub file_size_mb: f64,
}

// Shape of whisper's `--output_format json` file. Extra keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WhisperJson {
    text: String,
    language: Option<String>,
    segments: Vec<Segment>,
}

static NEXT_RUN: AtomicU64 = AtomicU64::new(0);

/// Runs the external `whisper` command line tool and reads back its output.
///
/// Every call writes into its own directory below `output_dir`, so
/// concurrent runs on files with the same name never read each other's
/// output, and a file left over from an earlier run is never picked up.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    binary: PathBuf,
    model: WhisperModel,
    output_dir: PathBuf,
}

impl WhisperCli {
    pub fn new(binary: impl Into<PathBuf>, model: WhisperModel) -> Self {
        Self {
            binary: binary.into(),
            model,
            output_dir: std::env::temp_dir().join("medical_intake_stt"),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn model(&self) -> WhisperModel {
        self.model
    }

    pub async fn transcribe(&self, audio: &Path) -> Result<String, TranscriptionError> {
        let raw = self.run(audio, "txt").await?;
        let text = raw.trim().to_string();
        if text.is_empty() {
            tracing::warn!("Transcription completed but no text was extracted");
        } else {
            tracing::info!(
                "Transcription completed. Text length: {} characters",
                text.len()
            );
        }
        Ok(text)
    }

    /// Like [`transcribe`](Self::transcribe) but keeps the detected language
    /// and the timed segments.
    pub async fn transcribe_with_metadata(
        &self,
        audio: &Path,
    ) -> Result<TranscriptionMetadata, TranscriptionError> {
        let raw = self.run(audio, "json").await?;
        let parsed: WhisperJson =
            serde_json::from_str(&raw).map_err(|e| TranscriptionError::Failed {
                file: display_name(audio),
                reason: format!("unreadable whisper JSON: {}", e),
            })?;

        let metadata = TranscriptionMetadata {
            text: parsed.text.trim().to_string(),
            language: parsed.language.unwrap_or_else(|| "unknown".to_string()),
            segments: parsed.segments,
            file_path: audio.display().to_string(),
            model_used: self.model.as_str().to_string(),
            file_size_mb: (file_size_mb(audio)? * 100.0).round() / 100.0,
        };
        tracing::info!(
            "Detailed transcription completed. Language detected: {}",
            metadata.language
        );
        Ok(metadata)
    }

    // Runs whisper into a fresh per-call directory and returns the contents
    // of `<stem>.<format>`. The directory is removed afterwards.
    async fn run(&self, audio: &Path, format: &str) -> Result<String, TranscriptionError> {
        validate_audio_path(audio)?;
        let file_name = display_name(audio);

        let run_dir = self.output_dir.join(format!(
            "run_{}_{}",
            std::process::id(),
            NEXT_RUN.fetch_add(1, Ordering::Relaxed)
        ));
        if run_dir.exists() {
            tokio::fs::remove_dir_all(&run_dir).await?;
        }
        tokio::fs::create_dir_all(&run_dir).await?;

        let result = self.run_in(audio, format, &run_dir, &file_name).await;

        if let Err(e) = tokio::fs::remove_dir_all(&run_dir).await {
            tracing::debug!("Could not remove {}: {}", run_dir.display(), e);
        }
        result
    }

    async fn run_in(
        &self,
        audio: &Path,
        format: &str,
        run_dir: &Path,
        file_name: &str,
    ) -> Result<String, TranscriptionError> {
        tracing::info!(
            "Transcribing {} with whisper model '{}'",
            file_name,
            self.model.as_str()
        );
        let output = tokio::process::Command::new(&self.binary)
            .arg(audio)
            .args(["--model", self.model.as_str()])
            .args(["--output_format", format])
            .arg("--output_dir")
            .arg(run_dir)
            .output()
            .await
            .map_err(|e| TranscriptionError::Failed {
                file: file_name.to_string(),
                reason: format!("could not run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("whisper exited with {} for {}", output.status, file_name);
            return Err(TranscriptionError::Failed {
                file: file_name.to_string(),
                reason: stderr.trim().to_string(),
            });
        }

        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_path = run_dir.join(format!("{}.{}", stem, format));
        tokio::fs::read_to_string(&output_path)
            .await
            .map_err(|e| TranscriptionError::Failed {
                file: file_name.to_string(),
                reason: format!("missing output {}: {}", output_path.display(), e),
            })
    }
}

fn display_name(audio: &Path) -> String {
    audio
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
