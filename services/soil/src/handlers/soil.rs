use anyhow::Context as _;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use uuid::Uuid;

use soilscan_domain::pagination::OffsetPage;

use crate::domain::types::UploadPolicy;
use crate::error::SoilServiceError;
use crate::handlers::extract::CurrentUser;
use crate::state::AppState;
use crate::usecase::analysis::{
    AnalyzeInput, AnalyzeSoilUseCase, DeleteAnalysisUseCase, FetchImageUseCase,
    GetAnalysisUseCase, ListAnalysesUseCase, SoilStatsUseCase,
};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

// ── POST /api/v1/soil/analyze ────────────────────────────────────────────────

pub async fn analyze(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(multipart, _): WithRejection<Multipart, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let (filename, bytes) = read_upload(multipart, &state.upload_policy).await?;
    let usecase = AnalyzeSoilUseCase {
        analyses: state.analysis_repo(),
        images: state.images.clone(),
        engine: state.engine.clone(),
        policy: state.upload_policy.clone(),
        inference_timeout: state.inference_timeout,
    };
    let record = usecase
        .execute(AnalyzeInput {
            user_id: user.id,
            filename,
            bytes,
        })
        .await?;
    Ok(Json(record))
}

/// Pull the `file` part out of the form.
///
/// The extension is checked from the part headers before any bytes are read, then the
/// size cap is enforced while streaming.
async fn read_upload(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<(String, Vec<u8>), SoilServiceError> {
    let max_bytes = policy.max_bytes;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error(max_bytes))? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        if policy.accepted_extension(&filename).is_none() {
            return Err(SoilServiceError::UnsupportedMediaType {
                allowed: policy.allowed_list(),
            });
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error(max_bytes))? {
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                return Err(SoilServiceError::PayloadTooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok((filename, bytes));
    }

    Err(SoilServiceError::MissingImage)
}

fn multipart_error(
    max_bytes: u64,
) -> impl Fn(axum::extract::multipart::MultipartError) -> SoilServiceError {
    move |e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            SoilServiceError::PayloadTooLarge { max_bytes }
        } else {
            SoilServiceError::InvalidInput(e.body_text())
        }
    }
}

// ── GET /api/v1/soil/history ─────────────────────────────────────────────────

pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Query(page), _): WithRejection<Query<OffsetPage>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = ListAnalysesUseCase {
        analyses: state.analysis_repo(),
    };
    Ok(Json(usecase.execute(user.id, page).await?))
}

// ── GET /api/v1/soil/stats ───────────────────────────────────────────────────

pub async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = SoilStatsUseCase {
        analyses: state.analysis_repo(),
    };
    Ok(Json(usecase.execute(user.id).await?))
}

// ── /api/v1/soil/analysis/{id} ───────────────────────────────────────────────

pub async fn get_analysis(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = GetAnalysisUseCase {
        analyses: state.analysis_repo(),
    };
    Ok(Json(usecase.execute(user.id, id).await?))
}

pub async fn delete_analysis(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = DeleteAnalysisUseCase {
        analyses: state.analysis_repo(),
        images: state.images.clone(),
    };
    usecase.execute(user.id, id).await?;
    Ok(Json(json!({ "message": "Analysis deleted" })))
}

// ── GET /api/v1/soil/image/{id} ──────────────────────────────────────────────

pub async fn image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = FetchImageUseCase {
        analyses: state.analysis_repo(),
        images: state.images.clone(),
    };
    let download = usecase.execute(user.id, id).await?;

    let disposition = HeaderValue::from_str(&content_disposition(&download.filename))
        .context("build content-disposition")?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(download.content_type),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    ))
}

/// `attachment; filename="..."` with anything outside printable ASCII, quotes and
/// backslashes replaced by `_`.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let safe = if safe.trim().is_empty() {
        "image".to_owned()
    } else {
        safe
    };
    format!("attachment; filename=\"{safe}\"")
}
