use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, ProviderError};
use crate::config::{GenerationParams, ProviderConfig};
use crate::web::models::Message;

/// Client for any endpoint following the OpenAI chat completions contract.
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    params: GenerationParams,
    client: Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        info!("Using completion provider at: {}", config.base_url);

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            params: config.params.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, messages: Vec<Message>) -> Result<Option<String>, ProviderError> {
        let payload = CompletionRequest {
            model: &self.params.model,
            messages: &messages,
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            top_p: self.params.top_p,
        };

        info!(
            "Sending {} messages to {} (max_tokens: {})",
            messages.len(),
            self.params.model,
            self.params.max_tokens
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status, body });
        }
        debug!("Provider response: {}", body);

        let parsed: CompletionResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        if let Some(text) = &content {
            info!("Response length: {} characters", text.len());
        }
        Ok(content)
    }
}
