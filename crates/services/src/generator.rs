use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use curio_core::prompt::Message;

use crate::config::QuizConfig;
use crate::error::GeneratorError;

/// External capability that turns a conversation into text.
///
/// With a schema the returned string must be a JSON document conforming to
/// it; without one it is free-form Markdown. Implementations signal failure
/// instead of returning partial content.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<String, GeneratorError>;
}

/// JSON shape required from the generator for quiz questions.
#[must_use]
pub fn question_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "question_text": {"type": "string"},
            "options": {"type": "array", "items": {"type": "string"}, "minItems": 4, "maxItems": 4},
            "correct_option_index": {"type": "integer", "minimum": 0, "maximum": 3},
            "explanation": {"type": "string"},
        },
        "required": ["question_text", "options", "correct_option_index", "explanation"],
    })
}

/// Chat-completions client for the Perplexity API.
#[derive(Clone)]
pub struct PerplexityGenerator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PerplexityGenerator {
    #[must_use]
    pub fn new(config: &QuizConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl ContentGenerator for PerplexityGenerator {
    async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        schema: Option<&Value>,
    ) -> Result<String, GeneratorError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model,
            messages,
            response_format: schema
                .map(|schema| json!({"type": "json_schema", "json_schema": {"schema": schema}})),
        };

        debug!(
            model,
            message_count = messages.len(),
            structured = schema.is_some(),
            "requesting completion"
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeneratorError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GeneratorError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
