mod openai;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::web::models::Message;

pub use openai::OpenAiProvider;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A text-completion backend.
///
/// Returns the first candidate's content, or `None` when the provider
/// answered successfully but produced no text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: Vec<Message>) -> Result<Option<String>, ProviderError>;
}
