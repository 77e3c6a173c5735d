use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::infra::store::StoreError;

/// Rejections produced by the token service. All of these map to 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid access token")]
    InvalidAccessToken,
    #[error("user-agent mismatch, all sessions invalidated")]
    SessionInvalidated,
    #[error("token record not found")]
    RecordNotFound,
    #[error("refresh token already used or blocked")]
    ReplayOrRevoked,
    #[error("invalid refresh token")]
    InvalidRefreshSecret,
    #[error("token revoked")]
    TokenRevoked,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("dependency failure: {0}")]
    Dependency(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Dependency(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
