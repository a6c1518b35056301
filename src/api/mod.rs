pub mod error;
pub mod handlers;

pub use error::{AppError, ErrorResponse};
pub use handlers::{health_check, upload_invoices, OutputFormat};

use crate::service::ValidationService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn router(service: Arc<ValidationService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/upload_invoices", post(upload_invoices))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(max_upload_bytes)))
        .with_state(service)
}
