use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::config::GenerationConfig;
use crate::error::GenerationError;

/// Remote text and image generation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the generated text for `prompt`.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Returns a base64-encoded PNG without a data-URI prefix.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Chat-completions client for text and a JSON image endpoint.
pub struct HttpGenerator {
    client: reqwest::Client,
    config: GenerationConfig,
}

impl HttpGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn request_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let res = self.client.post(&self.config.text_endpoint)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let payload: Value = res.json().await?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("Failed to generate text");
            return Err(GenerationError::ResponseError(format!("{status}: {message}")));
        }

        let parsed: ChatResponse = serde_json::from_value(payload)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        parsed.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("response has no choices".into()))
    }

    async fn request_image(&self, prompt: &str) -> Result<String, GenerationError> {
        let res = self.client.post(&self.config.image_endpoint)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "*/*")
            .json(&ImageRequest { prompt })
            .send()
            .await?;

        let status = res.status();
        let payload: Value = res.json().await?;

        if !status.is_success() {
            return Err(GenerationError::ResponseError(format!("{status}: Failed to generate image")));
        }

        match payload["data"]["photo"].as_str() {
            Some(photo) if !photo.is_empty() => Ok(photo.to_string()),
            _ => Err(GenerationError::MalformedResponse("Failed to generate image".into())),
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        self.request_text(prompt).await.map_err(|e| {
            error!("Text generation error: {}", e);
            e
        })
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        self.request_image(prompt).await.map_err(|e| {
            error!("Image generation error: {}", e);
            e
        })
    }
}
