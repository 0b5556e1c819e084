use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Missing or malformed request data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert rejected by the unique key on `order_id`
    #[error("Duplicate order id: {0}")]
    UniqueViolation(String),

    /// Gateway unreachable or answered with a failure status
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gateway answered successfully but the body could not be understood
    #[error("Invalid gateway response: {0}")]
    GatewayResponse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Webhook signature missing or wrong
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A write did not land as expected when read back
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(error = %self, code = status_code.as_u16(), "Request failed");
        }

        HttpResponse::build(status_code).json(serde_json::json!({
            "success": false,
            "error": self.public_message(),
            "code": status_code.as_u16(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_)
            | AppError::UniqueViolation(_)
            | AppError::Gateway(_)
            | AppError::GatewayResponse(_)
            | AppError::VerificationFailed(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        AppError::Gateway(msg.into())
    }

    pub fn gateway_response(msg: impl Into<String>) -> Self {
        AppError::GatewayResponse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Message safe to show to donors and gateway callers.
    ///
    /// Storage and internal failures are reduced to a generic text; the full
    /// error is logged by `error_response`.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            AppError::Gateway(_) | AppError::GatewayResponse(_) => {
                "Failed to create payment transaction".to_string()
            }
            AppError::VerificationFailed(_) => "Failed to verify donation update".to_string(),
            AppError::Database(_)
            | AppError::UniqueViolation(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Map insert errors, surfacing unique-key collisions as their own kind
    pub fn from_insert(err: sqlx::Error, order_id: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::UniqueViolation(order_id.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}
