use axum::{body::Bytes, middleware, routing::any, Router};

pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod server;

#[derive(Clone)]
pub struct AppState {
    /// Zero-filled response body shared by every `/work` request.
    pub payload: Bytes,
}

impl AppState {
    pub fn new(payload_size: usize) -> Self {
        Self {
            payload: Bytes::from(vec![0u8; payload_size]),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/work", any(http::handlers::work))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
