//! HTTP surface for the edge route resolver
//!
//! One POST endpoint plus a zero-logic CORS preflight. The resolver itself
//! never crashes a request: every failure becomes a typed `{error, detail}`
//! body with a mapped status code.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::error;

use crate::edge::{EdgeRequest, EdgeRouteResolver};
use crate::errors::EdgeError;

/// Error body of the resolution contract.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            EdgeError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            EdgeError::NotFound { .. } => StatusCode::NOT_FOUND,
            EdgeError::GeocodeInsufficient { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EdgeError::RoutingUnavailable { .. } => StatusCode::BAD_GATEWAY,
            EdgeError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if matches!(self, EdgeError::Internal { .. }) {
            error!(error = %self, "Edge resolution failed unexpectedly");
        }

        let body = ErrorBody {
            error: self.code(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the application router.
pub fn router(resolver: Arc<EdgeRouteResolver>) -> Router {
    Router::new()
        .route(
            "/api/v1/route/resolve",
            post(resolve_route).options(preflight),
        )
        .route("/health", get(health))
        .with_state(resolver)
}

/// Handler for `POST /api/v1/route/resolve`.
async fn resolve_route(
    State(resolver): State<Arc<EdgeRouteResolver>>,
    Json(request): Json<EdgeRequest>,
) -> Response {
    match resolver.resolve(request).await {
        Ok(body) => with_cors(Json(body).into_response()),
        Err(e) => with_cors(e.into_response()),
    }
}

/// Zero-logic preflight response for cross-origin negotiation.
async fn preflight() -> Response {
    with_cors(StatusCode::NO_CONTENT.into_response())
}

async fn health() -> &'static str {
    "ok"
}

/// Applies permissive CORS headers to a response.
fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}
