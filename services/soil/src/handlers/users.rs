use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::{Deserialize, Serialize};
use serde_json::json;

use soilscan_auth_types::cookie::{refresh_token as refresh_cookie, set_refresh_token_cookie};

use crate::error::SoilServiceError;
use crate::state::AppState;
use crate::usecase::register::{RegisterInput, RegisterUseCase};
use crate::usecase::token::{LoginInput, LoginUseCase, RefreshUseCase};
use crate::usecase::verification::VerifyCodeUseCase;

const TOKEN_TYPE: &str = "bearer";

// ── POST /api/v1/users/register ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hashing: state.hashing.clone(),
        verification: state.issue_code(),
    };
    let user = usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Verification code sent",
            "email": user.email,
        })),
    ))
}

// ── POST /api/v1/users/verify ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<VerifyRequest>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = VerifyCodeUseCase {
        users: state.user_repo(),
        codes: state.verification_cache(),
    };
    usecase.execute(body.email.trim(), &body.code).await?;
    Ok(Json(json!({ "message": "Email verified" })))
}

// ── POST /api/v1/users/resend-code ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

pub async fn resend_code(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ResendRequest>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    state.issue_code().execute(body.email.trim()).await?;
    Ok(Json(json!({ "message": "Verification code sent" })))
}

// ── POST /api/v1/users/login ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, SoilServiceError>,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        hashing: state.hashing.clone(),
        tokens: state.tokens.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_refresh_token_cookie(
        jar,
        out.refresh.token.clone(),
        state.tokens.refresh_ttl().num_seconds(),
        state.cookie_secure,
    );
    let body = LoginResponse {
        access_token: out.access.token,
        refresh_token: out.refresh.token,
        token_type: TOKEN_TYPE,
    };
    Ok((jar, Json(body)))
}

// ── POST /api/v1/users/refresh ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, SoilServiceError> {
    let usecase = RefreshUseCase {
        tokens: state.tokens.clone(),
    };
    let access = usecase.execute(refresh_cookie(&jar))?;
    Ok(Json(RefreshResponse {
        access_token: access.token,
        token_type: TOKEN_TYPE,
    }))
}
