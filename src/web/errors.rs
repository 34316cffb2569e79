use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};
use log::{error, warn};

use crate::model::ProviderError;
use crate::web::models::ChatResponse;

/// Reply sent for every server-side failure. Internal detail stays in the log.
pub const GENERIC_FAILURE: &str = "Something went wrong talking to the AI. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Text the caller is allowed to see.
    pub fn reply(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::Provider(_) | Self::Internal(_) => GENERIC_FAILURE,
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(ChatResponse {
            reply: self.reply().to_string(),
        })
    }
}

/// Maps body extraction failures onto the `{ reply }` shape.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    warn!("Rejected chat payload: {}", err);
    let (status, reply) = match &err {
        error::JsonPayloadError::OverflowKnownLength { limit, .. }
        | error::JsonPayloadError::Overflow { limit } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds limit of {} bytes.", limit),
        ),
        error::JsonPayloadError::ContentType => (
            StatusCode::BAD_REQUEST,
            "Request body must be JSON.".to_string(),
        ),
        _ => (StatusCode::BAD_REQUEST, "Request body is not valid JSON.".to_string()),
    };
    let response = HttpResponse::build(status).json(ChatResponse { reply });
    error::InternalError::from_response(err, response).into()
}

/// Last-resort net for 500s that escaped without a JSON body.
pub fn render_internal_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_json = res
        .response()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    error!("Unhandled server error on {}", res.request().path());
    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError().json(ChatResponse {
        reply: GENERIC_FAILURE.to_string(),
    });
    let res: ServiceResponse<EitherBody<B>> =
        ServiceResponse::new(req, response).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
