use crate::export::ExportError;
use crate::input::InputError;
use axum::extract::multipart::MultipartError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 接口错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("No file uploaded: expected multipart field 'file'")]
    MissingFile,
    #[error("Upload read error: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Response serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Validation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(_) | AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Export(_) | AppError::Serialize(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }

        let response = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(response)).into_response()
    }
}
