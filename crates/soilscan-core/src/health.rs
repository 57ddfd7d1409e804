use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// Handler for `GET /healthz`: the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Outcome of one dependency check for `GET /readyz`.
#[derive(Debug, Clone, Serialize)]
pub struct Probe {
    pub name: &'static str,
    pub ok: bool,
}

impl Probe {
    pub fn new(name: &'static str, ok: bool) -> Self {
        Self { name, ok }
    }
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub checks: Vec<Probe>,
}

/// Fold probe results into a readiness response: 200 when all pass, 503 otherwise.
pub fn readiness(checks: Vec<Probe>) -> (StatusCode, Json<Readiness>) {
    let ready = checks.iter().all(|p| p.ok);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(Readiness { ready, checks }))
}
