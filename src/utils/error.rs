use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

// Stock messages returned to clients
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request";
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated";
pub const INVALID_DOCUMENT_ID_MESSAGE: &str = "Invalid document ID";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

#[derive(Debug)]
pub enum AppError {
    /// Malformed, oversized or failed-validation input. The detail is only logged.
    InvalidRequest(String),
    NotAuthenticated,
    InvalidDocumentId(String),
    /// A provider rejected (or could not verify) an auth token.
    InvalidToken(String),
    DatabaseError(String),
    Internal(String),
}

/// Body of every failed JSON response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_message: String,
}

impl AppError {
    /// The fixed message the client sees for this error.
    pub fn client_message(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => INVALID_REQUEST_MESSAGE,
            AppError::NotAuthenticated => NOT_AUTHENTICATED_MESSAGE,
            AppError::InvalidDocumentId(_) => INVALID_DOCUMENT_ID_MESSAGE,
            AppError::InvalidToken(_) => INVALID_TOKEN_MESSAGE,
            AppError::DatabaseError(_) | AppError::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::NotAuthenticated => write!(f, "Not authenticated"),
            AppError::InvalidDocumentId(id) => write!(f, "Invalid document ID: {}", id),
            AppError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl ResponseError for AppError {
    // Client-facing failures are ordinary payloads, not transport errors
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("❌ {}", self);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error_message: self.client_message().to_string(),
        })
    }
}
