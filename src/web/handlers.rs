use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::web::errors::ChatError;
use crate::web::models::{ChatRequest, ChatResponse, HealthResponse};
use crate::AppState;

// Health check endpoint, also served at the root
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        service: data.service_name.clone(),
        uptime: data.uptime().as_secs_f64(),
    })
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ChatError> {
    let request_id = Uuid::new_v4();
    let response = data.chat.handle(req.into_inner(), request_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ChatResponse {
        reply: "Not found.".to_string(),
    })
}
