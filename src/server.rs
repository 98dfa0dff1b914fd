#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::post,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    constants::CHECK_CODE_ROUTE,
    grader::{Grader, fallback_judgment},
    types::{GradeRequest, Verdict},
};

/// Builds the router serving the grading endpoint.
///
/// `cors_origin` is the lesson UI origin; an origin that is not a valid header
/// value disables the CORS layer.
pub fn router(grader: Grader, cors_origin: &str) -> Router {
    let app = Router::new()
        .route(CHECK_CODE_ROUTE, post(check_code))
        .with_state(grader)
        .layer(TraceLayer::new_for_http());

    match HeaderValue::from_str(cors_origin) {
        Ok(origin) => app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(true),
        ),
        Err(_) => {
            tracing::warn!(cors_origin, "invalid CORS origin, serving without CORS");
            app
        }
    }
}

/// `POST /api/openai/check-code`. Always answers 200 with a verdict.
async fn check_code(
    State(grader): State<Grader>,
    body: Result<Json<GradeRequest>, JsonRejection>,
) -> Json<Verdict> {
    match body {
        Ok(Json(request)) => Json(grader.grade(&request).await),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable grading request");
            let mut verdict = fallback_judgment();
            verdict.feedback = grader.markers().apply(&verdict.feedback);
            Json(verdict)
        }
    }
}

/// Binds `addr` and serves the grading endpoint until the process stops.
pub async fn serve(addr: SocketAddr, grader: Grader, cors_origin: &str) -> Result<()> {
    let app = router(grader, cors_origin);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;

    tracing::info!("Serving {CHECK_CODE_ROUTE} on http://{addr}");

    axum::serve(listener, app)
        .await
        .context("Grading server stopped unexpectedly")
}
