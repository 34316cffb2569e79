use std::sync::Arc;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info};

use chat_relay::config::Config;
use chat_relay::memory::MemoryBuffer;
use chat_relay::model::OpenAiProvider;
use chat_relay::web::chat::ChatService;
use chat_relay::web::{errors, handlers, routes};
use chat_relay::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat relay");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match OpenAiProvider::new(&config.provider) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to initialize completion provider: {}", e);
            std::process::exit(1);
        }
    };

    let memory = Arc::new(MemoryBuffer::new(config.memory_capacity));
    let chat = ChatService::new(Arc::new(provider), memory)
        .with_structure(config.enforce_structure)
        .with_default_system_prompt(config.default_system_prompt.clone());
    let app_state = Data::new(AppState::new(config.service_name.clone(), chat));

    info!(
        "Memory capacity: {}, structure enforcement: {}",
        config.memory_capacity, config.enforce_structure
    );

    let static_dir = config.static_dir.clone();
    let serve_static = static_dir.is_dir();
    if serve_static {
        info!("Serving static assets from {}", static_dir.display());
    } else {
        info!(
            "Static directory {} not found, static assets disabled",
            static_dir.display()
        );
    }

    let body_limit = config.body_limit;
    let cors_origin = config.cors_origin.clone();

    info!("Listening on {}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
            None => Cors::permissive(),
        };

        let mut app = App::new()
            .app_data(app_state.clone())
            .configure(routes::configure(body_limit));
        if serve_static {
            app = app.service(
                fs::Files::new("/static", static_dir.clone()).index_file("index.html"),
            );
        }

        app.default_service(actix_web::web::to(handlers::not_found))
            .wrap(ErrorHandlers::new().handler(
                StatusCode::INTERNAL_SERVER_ERROR,
                errors::render_internal_error,
            ))
            .wrap(cors)
            .wrap(Logger::default())
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("server terminated with an error")?;

    info!("Chat relay stopped");
    Ok(())
}
