//! HTTP surface: two POST routes over the JSON envelopes.
//!
//! Malformed envelopes and undecodable base64 are the caller's fault
//! (400); everything surfaced by the core is reported as 500 with the
//! error message in the `{ "error": ... }` body.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use veristore_common::wire::{ErrorBody, ProofRequest, ProofResponse, UploadRequest};
use veristore_merkle::Hash;

use crate::server::Server;

pub fn router(server: Arc<Server>) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/request", post(request))
        .with_state(server)
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
        }
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn upload(
    State(server): State<Arc<Server>>,
    Json(req): Json<UploadRequest>,
) -> Result<StatusCode, ApiError> {
    let content = BASE64.decode(&req.content).map_err(ApiError::bad_request)?;
    server
        .upload(&req.root, req.index, req.total, &content)
        .map_err(ApiError::internal)?;
    Ok(StatusCode::OK)
}

async fn request(
    State(server): State<Arc<Server>>,
    Json(req): Json<ProofRequest>,
) -> Result<Json<ProofResponse>, ApiError> {
    let (content, proof) = server
        .request(&req.root, req.index)
        .map_err(ApiError::internal)?;
    Ok(Json(ProofResponse {
        content: BASE64.encode(content),
        proof: proof
            .hashes()
            .iter()
            .map(|h: &Hash| BASE64.encode(h.as_bytes()))
            .collect(),
    }))
}
