use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::{BalanceError, LookupError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(#[from] LookupError),
    #[error("invalid address")]
    InvalidAddress,
    #[error("failed to connect")]
    Connect,
    #[error("failed to retrieve balance")]
    Retrieval,
}

impl From<BalanceError> for ApiError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InvalidAddress(_) => ApiError::InvalidAddress,
            BalanceError::Connect(reason) => {
                error!(%reason, "Balance lookup could not reach the node");
                ApiError::Connect
            }
            BalanceError::Retrieval(reason) => {
                error!(%reason, "Balance lookup failed");
                ApiError::Retrieval
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidAddress => StatusCode::BAD_REQUEST,
            ApiError::Connect | ApiError::Retrieval => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
