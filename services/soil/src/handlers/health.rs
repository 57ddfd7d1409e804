use axum::extract::State;
use axum::response::IntoResponse;

use soilscan_core::health::{Probe, readiness};

use crate::state::AppState;

/// `GET /readyz`: database and Redis reachable.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.db.ping().await.is_ok();
    let redis = state.redis.get().await.is_ok();
    readiness(vec![Probe::new("database", db), Probe::new("redis", redis)])
}
