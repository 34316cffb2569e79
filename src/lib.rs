pub mod config;
pub mod memory;
pub mod model;
pub mod text;
pub mod web;

use std::time::{Duration, Instant};

use memory::MemoryBuffer;
use web::chat::ChatService;

// App state structure
pub struct AppState {
    pub service_name: String,
    pub chat: ChatService,
    started: Instant,
}

impl AppState {
    pub fn new(service_name: impl Into<String>, chat: ChatService) -> Self {
        Self {
            service_name: service_name.into(),
            chat,
            started: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn memory(&self) -> &MemoryBuffer {
        self.chat.memory()
    }
}
