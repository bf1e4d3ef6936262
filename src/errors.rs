use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::schema::ApiResponse;

/// Startup failures. These abort the process, they never reach a client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} must be set")]
    Config(&'static str),
    #[error("Cant connect to the DB")]
    DbConnect,
    #[error("Cant run database migrations")]
    Migrate,
    #[error("Cant prepare the image directories")]
    ImageStore,
    #[error("Cant build the SMTP mailer")]
    Mailer,
    #[error("Cant bind to the Socket")]
    SocketBind,
    #[error("Cant start the server")]
    ServerStart,
}

/// Request-level failures. Every variant renders the uniform response
/// envelope with its `status` field mirroring the HTTP status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid id.")]
    InvalidId,
    #[error("{message}")]
    NotFound { message: String, status: StatusCode },
    #[error("Access denied. No token provided.")]
    MissingToken,
    #[error("Invalid token.")]
    InvalidToken,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Database(String),
    #[error("{0}")]
    Email(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Entity lookup miss. Some endpoints answer these with 400 and some
    /// with 404, so the status is picked per call site.
    pub fn not_found(message: impl Into<String>, status: StatusCode) -> Self {
        ApiError::NotFound { message: message.into(), status }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId | ApiError::InvalidToken => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound { status, .. } => *status,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Email(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ApiResponse::<()> {
            data: None,
            error: Some(self.to_string()),
            message: self.to_string(),
            status: status.as_u16(),
        })
    }
}
