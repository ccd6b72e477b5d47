//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("model not found: '{0}'")]
    ModelNotFound(String),
    #[error("invalid model spec: {0}")]
    InvalidModel(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("model {model} has no attribute {attr}")]
    UnknownAttribute { model: String, attr: String },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("admin access required")]
    Forbidden,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Registry(RegistryError::ModelNotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            AppError::Registry(RegistryError::InvalidModel(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "registry_error")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::UnknownAttribute { .. } => (StatusCode::BAD_REQUEST, "unknown_attribute"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
