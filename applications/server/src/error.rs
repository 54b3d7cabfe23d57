/// Server error types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chorus_core::{ChorusError, ErrorCode, FieldError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Domain(#[from] ChorusError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<chorus_storage::StorageError> for ServerError {
    fn from(err: chorus_storage::StorageError) -> Self {
        ServerError::Domain(err.into())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Domain(ChorusError::invalid("body", rejection.body_text()))
    }
}

impl ServerError {
    /// Stable code reported to the caller
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::Domain(e) => e.code(),
            ServerError::Jwt(_) => ErrorCode::Unauthenticated,
            ServerError::Config(_) | ServerError::Io(_) => ErrorCode::InternalServerError,
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();

        let (message, fields): (String, &[FieldError]) = match &self {
            ServerError::Domain(e) if code != ErrorCode::InternalServerError => {
                (e.to_string(), e.fields())
            }
            ServerError::Jwt(e) => {
                tracing::warn!("JWT error: {:?}", e);
                ("Invalid token".to_string(), &[])
            }
            other => {
                tracing::error!("Internal error: {}", other);
                ("Internal server error".to_string(), &[])
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "fields": fields,
            }
        }));

        (status_for(code), body).into_response()
    }
}
