use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::{auth::jwt::TokenError, users::RepoError};

/// Every failure a request can end in. Rendered as `{"msg": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    DuplicateEmail,
    #[error("{0}")]
    InvalidCredentials(&'static str),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::Token(TokenError::Missing | TokenError::Expired) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Token(TokenError::Malformed(_) | TokenError::InvalidSignature) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Token(TokenError::Missing) => "Authorization token is missing".into(),
            ApiError::Token(TokenError::Expired) => "Token has expired".into(),
            ApiError::Token(e) => format!("Invalid token: {e}"),
            ApiError::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail => ApiError::DuplicateEmail,
            RepoError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Validation(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(e) => error!(error = %e, "request failed"),
            ApiError::Token(e) => warn!(reason = %e, %status, "token rejected"),
            _ => {}
        }
        (status, Json(json!({ "msg": self.message() }))).into_response()
    }
}
