use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_QUESTION_MODEL: &str = "sonar-pro";
pub const DEFAULT_SUMMARY_MODEL: &str = "sonar-deep-research";

const API_KEY_VAR: &str = "PERPLEXITY_API_KEY";
const SECRETS_FILE: &str = "secrets.toml";

/// Connection settings for the content generator.
#[derive(Clone, Debug)]
pub struct QuizConfig {
    pub api_key: String,
    pub base_url: String,
    pub question_model: String,
    pub summary_model: String,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "PERPLEXITY_API_KEY")]
    api_key: Option<String>,
}

impl QuizConfig {
    /// Resolve configuration, taking the API key from the environment first
    /// and a local `secrets.toml` second.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` when no source provides a key,
    /// or a read/parse error for an unusable secrets file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_secrets(Path::new(SECRETS_FILE))
    }

    /// Same as [`QuizConfig::load`] with an explicit secrets file path.
    ///
    /// # Errors
    ///
    /// See [`QuizConfig::load`].
    pub fn load_with_secrets(secrets_path: &Path) -> Result<Self, ConfigError> {
        let api_key = match env_key(API_KEY_VAR) {
            Some(key) => key,
            None => file_key(secrets_path)?.ok_or(ConfigError::MissingApiKey)?,
        };

        Ok(Self {
            api_key,
            base_url: env::var("CURIO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            question_model: env::var("CURIO_QUESTION_MODEL")
                .unwrap_or_else(|_| DEFAULT_QUESTION_MODEL.into()),
            summary_model: env::var("CURIO_SUMMARY_MODEL")
                .unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.into()),
        })
    }
}

fn env_key(var: &str) -> Option<String> {
    let key = env::var(var).ok()?;
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

fn file_key(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::SecretsRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_secrets(&raw).map_err(|source| ConfigError::SecretsParse {
        path: path.display().to_string(),
        source,
    })
}

fn parse_secrets(raw: &str) -> Result<Option<String>, toml::de::Error> {
    let secrets: SecretsFile = toml::from_str(raw)?;
    Ok(secrets
        .api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty()))
}
