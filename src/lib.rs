pub mod api;
pub mod config;
pub mod export;
pub mod input;
pub mod models;
pub mod service;

pub use api::router;
pub use config::AppConfig;
pub use service::ValidationService;
