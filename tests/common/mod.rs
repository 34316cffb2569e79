//! Shared fixtures for the HTTP tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use chat_relay::memory::MemoryBuffer;
use chat_relay::model::{CompletionProvider, ProviderError};
use chat_relay::web::chat::ChatService;
use chat_relay::web::models::Message;
use chat_relay::AppState;

/// What the scripted provider does when called.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Empty,
    Fail,
    Panic,
}

/// Provider double that records every outbound message list.
pub struct ScriptedProvider {
    script: Script,
    delay: Duration,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, messages: Vec<Message>) -> Result<Option<String>, ProviderError> {
        self.calls.lock().unwrap().push(messages);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.script {
            Script::Reply(text) => Ok(Some(text.clone())),
            Script::Empty => Ok(None),
            Script::Fail => Err(ProviderError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream exploded: sk-secret-detail".to_string(),
            }),
            Script::Panic => panic!("provider blew up"),
        }
    }
}

/// Builds shared state around `provider` with a fresh memory buffer.
pub fn state_with(
    provider: Arc<ScriptedProvider>,
    configure: impl FnOnce(ChatService) -> ChatService,
) -> web::Data<AppState> {
    let memory = Arc::new(MemoryBuffer::default());
    let chat = configure(ChatService::new(provider, memory));
    web::Data::new(AppState::new("chat-relay-test", chat))
}

pub fn state(provider: Arc<ScriptedProvider>) -> web::Data<AppState> {
    state_with(provider, |chat| chat)
}

/// Initializes the full application the way `main` wires it.
macro_rules! init_app {
    ($state:expr) => {
        init_app!($state, 1024 * 1024)
    };
    ($state:expr, $limit:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(chat_relay::web::routes::configure($limit))
                .default_service(actix_web::web::to(chat_relay::web::handlers::not_found))
                .wrap(actix_web::middleware::ErrorHandlers::new().handler(
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    chat_relay::web::errors::render_internal_error,
                )),
        )
        .await
    };
}
