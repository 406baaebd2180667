//! Shared error types for the services crate.

use thiserror::Error;

use curio_core::model::{QuestionError, SessionError, SummaryError};

/// Errors emitted by `ContentGenerator` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("content generator returned an empty response")]
    EmptyResponse,
    #[error("content generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuizService`.
///
/// Generation and malformed-response failures are also written to the
/// session's error field as a single user-visible message; session errors
/// are transient input validation and are not.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question payload is not valid JSON: {0}")]
    QuestionJson(#[from] serde_json::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl QuizError {
    /// True for failures that should be recorded on the session: the
    /// generator call failed or its payload did not survive validation.
    #[must_use]
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::QuestionJson(_) | Self::Question(_) | Self::Summary(_) | Self::Generator(_)
        )
    }
}

/// Errors produced while resolving quiz configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(
        "no API key found: set PERPLEXITY_API_KEY or add it to a local secrets.toml"
    )]
    MissingApiKey,
    #[error("failed to read secrets file {path}")]
    SecretsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse secrets file {path}")]
    SecretsParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
