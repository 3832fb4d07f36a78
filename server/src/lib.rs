//! nftlint HTTP transport.
//!
//! Routes:
//!
//! - `GET /`: demo page for pasting a descriptor and viewing the verdict
//! - `POST /lint`: JSON descriptor in, verdict JSON out (always 200 for a
//!   well-formed body; 400 with an empty body when the body is not JSON)
//!
//! Validation is synchronous file I/O, so each request runs the pipeline on
//! the blocking pool. The server keeps no per-request state.

#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use nftlint_harness::pipeline::Validator;
use nftlint_harness::verdict::Verdict;
use nftlint_kernel::reject::Rejection;

const DEMO_PAGE: &str = include_str!("demo.html");

#[derive(Clone)]
pub struct AppState {
    validator: Arc<Validator>,
}

impl AppState {
    #[must_use]
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

/// Router with the demo page, the lint endpoint and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(demo_page))
        .route("/lint", post(lint))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn demo_page() -> Html<&'static str> {
    Html(DEMO_PAGE)
}

async fn lint(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let Json(value) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Bad request: malformed JSON");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let validator = Arc::clone(&state.validator);
    let verdict = match tokio::task::spawn_blocking(move || validator.validate(value)).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(error = %e, "validation task failed");
            Verdict::from(Err(Rejection::internal_failure()))
        }
    };
    Json(verdict).into_response()
}
