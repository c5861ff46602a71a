// src/prescription/client.rs
use crate::config::SuggestionConfig;
use crate::prescription::models::{Assessment, PatientInfo, SuggestionOutcome};
use crate::prescription::prompt::{
    build_medical_prompt, extract_json_from_response, fallback_assessment, SYSTEM_PROMPT,
};
use crate::utils::error::SuggestionError;
use reqwest::header;
use serde_json::json;

const CLIENT_USER_AGENT: &str = concat!("medical_intake/", env!("CARGO_PKG_VERSION"));
const REFERER: &str = "http://localhost";
const APP_TITLE: &str = "Medical AI Simulation";

/// Talks to an OpenAI-compatible chat-completion endpoint on behalf of the
/// intake pipeline.
pub struct PrescriptionClient {
    http: reqwest::Client,
    config: SuggestionConfig,
}

impl PrescriptionClient {
    pub fn new(config: SuggestionConfig) -> Result<Self, SuggestionError> {
        let http = reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Single request, no retries. Every failure mode is reported as a
    /// `SuggestionError`.
    pub async fn request_assessment(
        &self,
        patient: &PatientInfo,
    ) -> Result<Assessment, SuggestionError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_medical_prompt(patient) },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        tracing::info!("Sending suggestion request to: {}", self.config.api_url);
        tracing::debug!("Using model: {}", self.config.model);

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header(header::REFERER, REFERER)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await?; // Propagates reqwest::Error as SuggestionError::Network

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            tracing::error!("HTTP error status: {} from {}", status, self.config.api_url);
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(SuggestionError::Unauthorized);
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SuggestionError::RateLimited);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestionError::Http { status, body });
        }

        let payload: serde_json::Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(SuggestionError::EmptyChoices)?;
        tracing::debug!("Raw model response: {}", content);

        extract_json_from_response(content)
            .map(Assessment::mark_simulated)
            .ok_or_else(|| SuggestionError::Parse {
                raw_content: content.to_string(),
            })
    }

    /// Never fails: any error is logged and replaced by the fallback record.
    pub async fn suggest(&self, patient: &PatientInfo) -> SuggestionOutcome {
        let timestamp = chrono::Utc::now().to_rfc3339();
        match self.request_assessment(patient).await {
            Ok(ai_assessment) => {
                tracing::info!(
                    "Received simulated assessment with {} medication(s)",
                    ai_assessment.medications.len()
                );
                SuggestionOutcome::Success { ai_assessment, timestamp }
            }
            Err(e) => {
                tracing::warn!("Suggestion failed, using fallback: {}", e);
                let error = match &e {
                    SuggestionError::Network(inner) if inner.is_timeout() => {
                        "Request timed out".to_string()
                    }
                    other => other.to_string(),
                };
                SuggestionOutcome::Fallback {
                    error,
                    fallback: fallback_assessment(patient),
                    timestamp,
                }
            }
        }
    }
}
