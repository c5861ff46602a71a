// src/main.rs
use clap::{ArgGroup, Parser};
use medical_intake::config::SuggestionConfig;
use medical_intake::prescription::{PatientInfo, PrescriptionClient};
use medical_intake::storage::{IntakeRecord, StorageManager};
use medical_intake::stt::{self, TranscriptionMetadata, WhisperCli, WhisperModel};
use medical_intake::utils::{self, AppError};
use medical_intake::MedicalEntityExtractor;
use std::io::Read;
use std::path::Path;

/// Turns a patient's spoken or typed complaint into structured fields and,
/// optionally, a simulated prescription suggestion.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").args(["transcript", "transcript_file", "audio"])))]
struct Args {
    /// Complaint text (reads stdin when no input flag is given)
    #[arg(short, long)]
    transcript: Option<String>,

    /// Read the complaint text from a file
    #[arg(short = 'f', long)]
    transcript_file: Option<String>,

    /// Transcribe an audio file with whisper first
    #[arg(short, long)]
    audio: Option<String>,

    /// Path or name of the whisper executable
    #[arg(long, default_value = "whisper")]
    whisper_bin: String,

    /// Whisper model size
    #[arg(long, value_enum, default_value_t = WhisperModel::Base)]
    whisper_model: WhisperModel,

    /// Keep whisper's detected language and timed segments in the record
    #[arg(long, requires = "audio")]
    with_metadata: bool,

    /// Save the transcript next to the audio file (<name>.txt)
    #[arg(long, requires = "audio")]
    save_transcript: bool,

    /// Save the transcript to this path instead
    #[arg(long, requires = "audio")]
    transcript_out: Option<String>,

    /// Request a simulated prescription suggestion (needs OPENROUTER_API_KEY)
    #[arg(short, long)]
    suggest: bool,

    /// Chat-completion endpoint (overrides OPENROUTER_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Model name (overrides OPENROUTER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Comma-separated medical history entries
    #[arg(long, value_delimiter = ',')]
    medical_history: Vec<String>,

    /// Comma-separated allergies
    #[arg(long, value_delimiter = ',')]
    allergies: Vec<String>,

    /// Directory to save the intake record as JSON
    #[arg(short, long)]
    output_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments. Suggestion settings are resolved here so a
    //    missing API key is reported before any work is done.
    let args = Args::parse();
    tracing::debug!("Starting processing for args: {:?}", args);
    let suggestion_config = resolve_suggestion_config(&args, |name| std::env::var(name).ok())?;

    // 3. Resolve the transcript. Transcription failures degrade to an absent
    //    transcript, which extracts to the empty record.
    let (transcript, transcription) = read_transcript(&args).await?;

    // 4. Extract entities
    let extractor = MedicalEntityExtractor::new()?;
    let entities = extractor.extract_entities(transcript.as_deref());
    tracing::info!(
        "Extracted {} symptom(s), age {:?}, gender {:?}, duration {:?}",
        entities.symptoms.len(),
        entities.age,
        entities.gender,
        entities.duration
    );

    let mut record = IntakeRecord::new(transcript, entities);
    if let Some(metadata) = transcription {
        record = record.with_transcription(metadata);
    }

    // 5. Optional prescription suggestion
    if let Some(config) = suggestion_config {
        let client = PrescriptionClient::new(config)?;
        let patient = PatientInfo::from_extraction(
            &record.entities,
            clean_list(&args.medical_history),
            clean_list(&args.allergies),
        );
        let outcome = client.suggest(&patient).await;
        if !outcome.is_success() {
            tracing::warn!("Suggestion unavailable, returning fallback assessment");
        }
        record = record.with_suggestion(outcome);
    }

    // 6. Emit and optionally persist
    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Some(dir) = &args.output_dir {
        let storage = StorageManager::new(dir)?;
        match storage.save_record(&record) {
            Ok(path) => tracing::info!("Saved intake record to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save intake record: {}", e),
        }
    }

    Ok(())
}

/// `None` unless `--suggest` was given; then the key must be present.
fn resolve_suggestion_config(
    args: &Args,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<SuggestionConfig>, AppError> {
    if !args.suggest {
        return Ok(None);
    }

    let mut config = SuggestionConfig::from_lookup(lookup)?;
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url);
    }
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    Ok(Some(config))
}

async fn read_transcript(
    args: &Args,
) -> Result<(Option<String>, Option<TranscriptionMetadata>), AppError> {
    if let Some(text) = &args.transcript {
        return Ok((Some(text.clone()), None));
    }

    if let Some(path) = &args.transcript_file {
        tracing::info!("Reading transcript from: {}", path);
        let text = tokio::fs::read_to_string(path).await?;
        return Ok((Some(text.trim().to_string()), None));
    }

    if let Some(audio) = &args.audio {
        return Ok(transcribe_audio(args, Path::new(audio)).await);
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok((Some(text.trim().to_string()), None))
}

async fn transcribe_audio(
    args: &Args,
    audio: &Path,
) -> (Option<String>, Option<TranscriptionMetadata>) {
    let whisper = WhisperCli::new(&args.whisper_bin, args.whisper_model);
    let result = if args.with_metadata {
        whisper
            .transcribe_with_metadata(audio)
            .await
            .map(|metadata| (metadata.text.clone(), Some(metadata)))
    } else {
        whisper.transcribe(audio).await.map(|text| (text, None))
    };

    let (text, metadata) = match result {
        Ok(found) => found,
        Err(e) => {
            tracing::error!("Transcription failed, continuing without transcript: {}", e);
            return (None, None);
        }
    };

    if args.save_transcript || args.transcript_out.is_some() {
        let target = args.transcript_out.as_deref().map(Path::new);
        if let Err(e) = stt::save_transcript(&text, audio, target).await {
            tracing::error!("Failed to save transcript: {}", e);
        }
    }

    (Some(text), metadata)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medical_intake::config::API_KEY_ENV;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn suggest_without_key_fails_before_any_work() {
        let args = Args::try_parse_from(["medical_intake", "-t", "fever", "--suggest"]).unwrap();
        let err = resolve_suggestion_config(&args, no_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn no_key_needed_without_suggest() {
        let args = Args::try_parse_from(["medical_intake", "-t", "fever"]).unwrap();
        assert!(resolve_suggestion_config(&args, no_env).unwrap().is_none());
    }

    #[test]
    fn cli_flags_override_environment() {
        let args = Args::try_parse_from([
            "medical_intake",
            "-t",
            "fever",
            "-s",
            "--model",
            "cli/model",
            "--api-url",
            "http://127.0.0.1:1/v1",
        ])
        .unwrap();
        let lookup = |name: &str| (name == API_KEY_ENV).then(|| "key".to_string());
        let config = resolve_suggestion_config(&args, lookup).unwrap().unwrap();
        assert_eq!(config.model, "cli/model");
        assert_eq!(config.api_url, "http://127.0.0.1:1/v1");
    }

    #[test]
    fn transcript_flags_need_audio() {
        assert!(Args::try_parse_from(["medical_intake", "-t", "x", "--save-transcript"]).is_err());
        assert!(Args::try_parse_from(["medical_intake", "-a", "v.wav", "--with-metadata"]).is_ok());
    }

    #[test]
    fn list_flags_are_trimmed() {
        let args = Args::try_parse_from([
            "medical_intake",
            "-t",
            "x",
            "--allergies",
            "penicillin, ,latex ",
        ])
        .unwrap();
        assert_eq!(clean_list(&args.allergies), vec!["penicillin", "latex"]);
    }
}
