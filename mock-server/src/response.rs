//! The two JSON conventions the backend answers with.
//!
//! Success: `{code: 0, message, data}` with HTTP 200; `data` is always
//! serialized, as `null` when there is no payload.
//! Failure: `{code, error}` with `code` equal to the HTTP status.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Self {
        Self {
            code: 0,
            message: "success".into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: String,
}

pub type AppResult<T> = Result<T, AppError>;
pub type ApiReturn<T> = AppResult<ApiResponse<T>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Invalid query parameters: {0}")]
    InvalidQueryParams(#[from] QueryRejection),
    #[error("Invalid json body: {0}")]
    InvalidJsonBody(#[from] JsonRejection),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Account already exists: {0}")]
    AccountTaken(String),
    #[error("Failed to extract typed header: {0}")]
    MissingAuthorization(&'static str),
    #[error("JWT Error: {0}")]
    Token(&'static str),
    #[error("Account or Password is incorrect")]
    Login,
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidQueryParams(_) | AppError::InvalidJsonBody(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AccountTaken(_) => StatusCode::CONFLICT,
            AppError::MissingAuthorization(_) | AppError::Token(_) | AppError::Login => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
