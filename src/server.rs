//! HTTP API around the [Converter].
//!
//! Clients POST a query document to `/api/v1/convert` and get the compiled statements back as
//! JSON. The router is given the span it should log in, so nothing here relies on a global
//! logger being set up in a particular way.
use crate::engine::Converter;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn, Span};

pub struct AppState {
    pub converter: Converter,
    pub span: Span,
}

pub fn router(converter: Converter, span: Span) -> Router {
    let state = Arc::new(AppState { converter, span });

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/convert", post(convert))
        .route("/api/v1/convert/", post(convert))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "API is up and running",
    }))
}

async fn convert(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<Value>, ApiError> {
    state.span.in_scope(|| {
        if body.is_empty() {
            return Err(ApiError::BadRequest("Request body is empty".to_string()));
        }

        let input = std::str::from_utf8(&body)
            .map_err(|_| ApiError::BadRequest("Request body is not valid UTF-8".to_string()))?;

        debug!(bytes = body.len(), "Converting query document");

        let queries = state.converter.convert(input).map_err(|error| {
            if error.is_parse_error() {
                ApiError::BadRequest(error.to_string())
            } else {
                ApiError::Internal(error.to_string())
            }
        })?;

        info!(statements = queries.len(), "Converted query document");

        Ok(Json(json!({
            "status": "success",
            "data": { "queries": queries },
        })))
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                warn!(%message, "Rejected request");

                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Internal(message) => {
                warn!(%message, "Failed to handle request");

                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Endpoint not found".to_string()),
        };

        let body = json!({
            "error": "Error processing request",
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
