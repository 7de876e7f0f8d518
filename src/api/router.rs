//! HTTP router for the report service.
//!
//! Two routes, no auth: the liveness check at `/` and the report pipeline at
//! `/predict`. CORS is permissive for all routes, matching the browser
//! frontend the service was built for.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Cap on the multipart request body. ECG scans are photographs at most —
/// anything larger is not a waveform image.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the service router.
pub fn app_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::live))
        .route("/predict", post(endpoints::predict::predict))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}
