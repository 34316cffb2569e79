use std::sync::Arc;

use log::{error, info, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::memory::MemoryBuffer;
use crate::model::CompletionProvider;
use crate::text;
use crate::web::errors::ChatError;
use crate::web::models::{ChatRequest, ChatResponse, Message, Role};

/// Substituted when the provider succeeds but returns no text.
pub const EMPTY_REPLY: &str = "AI produced no response.";

/// A request that passed validation and sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidChat {
    pub message: String,
    pub system: Option<String>,
}

impl ChatRequest {
    pub fn validate(self) -> Result<ValidChat, ChatError> {
        let message = match self.message {
            Some(Value::String(message)) => message,
            Some(_) => return Err(ChatError::invalid("'message' must be a string.")),
            None => return Err(ChatError::invalid("'message' is required.")),
        };
        let message = text::sanitize(&message);
        if message.is_empty() {
            return Err(ChatError::invalid("'message' must not be empty."));
        }

        let system = match self.system {
            Some(Value::String(system)) => Some(system),
            Some(_) => return Err(ChatError::invalid("'system' must be a string.")),
            None => None,
        };

        Ok(ValidChat {
            message,
            system: system.map(|s| text::sanitize(&s)).filter(|s| !s.is_empty()),
        })
    }
}

/// Relays chat turns to the provider, keeping the shared memory window.
pub struct ChatService {
    provider: Arc<dyn CompletionProvider>,
    memory: Arc<MemoryBuffer>,
    enforce_structure: bool,
    default_system_prompt: Option<String>,
}

impl ChatService {
    pub fn new(provider: Arc<dyn CompletionProvider>, memory: Arc<MemoryBuffer>) -> Self {
        Self {
            provider,
            memory,
            enforce_structure: false,
            default_system_prompt: None,
        }
    }

    pub fn with_structure(mut self, enabled: bool) -> Self {
        self.enforce_structure = enabled;
        self
    }

    pub fn with_default_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.default_system_prompt = prompt;
        self
    }

    pub fn memory(&self) -> &MemoryBuffer {
        &self.memory
    }

    /// System entry (caller's first, then the server default) followed by
    /// the current memory window.
    pub fn build_messages(&self, system: Option<&str>) -> Vec<Message> {
        let system = system.or(self.default_system_prompt.as_deref());
        let mut messages = Vec::with_capacity(self.memory.capacity() + 1);
        if let Some(system) = system {
            messages.push(Message::new(Role::System, system));
        }
        messages.extend(self.memory.snapshot());
        messages
    }

    pub async fn handle(
        &self,
        request: ChatRequest,
        request_id: Uuid,
    ) -> Result<ChatResponse, ChatError> {
        let chat = request.validate()?;
        info!(
            "[{}] chat request ({} chars, system prompt: {})",
            request_id,
            chat.message.len(),
            chat.system.is_some()
        );

        // Stays in memory even if the provider call fails.
        self.memory.push(Role::User, chat.message.clone());
        let messages = self.build_messages(chat.system.as_deref());

        // Everything from the provider call to the assistant push runs in
        // the task, so a dropped request still records the reply. A provider
        // panic comes back as a JoinError.
        let provider = Arc::clone(&self.provider);
        let memory = Arc::clone(&self.memory);
        let enforce_structure = self.enforce_structure;
        let task = tokio::spawn(async move {
            let content = provider.complete(messages).await.map_err(|e| {
                error!("[{}] provider error: {}", request_id, e);
                ChatError::Provider(e)
            })?;

            let mut reply = match content {
                Some(text) if !text.trim().is_empty() => text,
                _ => {
                    warn!("[{}] provider returned no content", request_id);
                    EMPTY_REPLY.to_string()
                }
            };
            if enforce_structure {
                reply = text::enforce(&reply);
            }

            memory.push(Role::Assistant, reply.clone());
            info!("[{}] replied with {} chars", request_id, reply.len());
            Ok::<_, ChatError>(reply)
        });

        let reply = match task.await {
            Ok(outcome) => outcome?,
            Err(e) => {
                error!("[{}] provider task failed: {}", request_id, e);
                return Err(ChatError::Internal(e.to_string()));
            }
        };
        Ok(ChatResponse { reply })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> ChatRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn message_must_be_a_non_empty_string() {
        for body in [
            json!({}),
            json!({ "message": null }),
            json!({ "message": 123 }),
            json!({ "message": ["hi"] }),
            json!({ "message": "   " }),
            json!({ "message": "<script>alert(1)</script>" }),
        ] {
            let err = request(body.clone()).validate().unwrap_err();
            assert!(matches!(err, ChatError::InvalidInput(_)), "{body}");
        }
    }

    #[test]
    fn system_must_be_a_string_when_present() {
        let err = request(json!({ "message": "hi", "system": 7 }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[test]
    fn fields_are_sanitized() {
        let chat = request(json!({
            "message": " <script>x()</script>hello ",
            "system": "<i>terse</i>",
        }))
        .validate()
        .unwrap();
        assert_eq!(chat.message, "hello");
        assert_eq!(chat.system.as_deref(), Some("iterse/i"));
    }

    #[test]
    fn blank_system_counts_as_absent() {
        let chat = request(json!({ "message": "hi", "system": "<script>a</script>" }))
            .validate()
            .unwrap();
        assert!(chat.system.is_none());
    }
}
