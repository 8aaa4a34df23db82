//! Axum HTTP handlers for the web server

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::AppState;

/// Answers every method on `/work` with the shared static payload.
///
/// The body is a `Bytes` clone of the payload built at startup, so hyper
/// frames it with an exact `Content-Length`. A failed write to the client
/// ends that connection only.
pub async fn work(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Bytes::clone(&state.payload)).into_response()
}
