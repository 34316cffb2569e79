use actix_web::web;

use crate::web::{errors, handlers};

/// Registers the API routes with a JSON body cap of `body_limit` bytes.
pub fn configure(body_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(
            web::JsonConfig::default()
                .limit(body_limit)
                .error_handler(errors::json_error_handler),
        )
        .route("/", web::get().to(handlers::health_check))
        .route("/health", web::get().to(handlers::health_check))
        .route("/chat", web::post().to(handlers::chat));
    }
}
