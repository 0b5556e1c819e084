use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    HttpRequest,
};

use crate::core::AppError;

/// Turn JSON extractor failures into the usual 400 body
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected JSON body");

    let message = match err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body too large".to_string()
        }
        _ => "Invalid request format".to_string(),
    };

    AppError::Validation(message).into()
}

/// Turn query string failures into the usual 400 body
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected query string");
    AppError::validation("Invalid query parameters").into()
}
