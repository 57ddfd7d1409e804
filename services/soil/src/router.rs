use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use soilscan_core::health::healthz;
use soilscan_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    health::readyz,
    soil::{analyze, delete_analysis, get_analysis, history, image, stats},
    users::{login, refresh, register, resend_code, verify},
};
use crate::state::AppState;

/// Multipart framing allowance on top of the image size limit.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.upload_policy.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let users = Router::new()
        .route("/register", post(register))
        .route("/verify", post(verify))
        .route("/resend-code", post(resend_code))
        .route("/login", post(login))
        .route("/refresh", post(refresh));

    let soil = Router::new()
        .route("/analyze", post(analyze))
        .route("/history", get(history))
        .route("/stats", get(stats))
        .route("/analysis/{id}", get(get_analysis).delete(delete_analysis))
        .route("/image/{id}", get(image))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1/users", users)
        .nest("/api/v1/soil", soil)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
