// src/config.rs
use crate::utils::AppError;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const API_URL_ENV: &str = "OPENROUTER_API_URL";
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";

/// Everything the prescription client needs, handed over at construction.
#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl SuggestionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the key (required) plus optional URL/model overrides from the
    /// environment. CLI flags are applied on top by the caller.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Config(format!("{} is not set", API_KEY_ENV)))?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup(API_URL_ENV) {
            config.api_url = url;
        }
        if let Some(model) = lookup(MODEL_ENV) {
            config.model = model;
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
