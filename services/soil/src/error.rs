use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Coarse error class; decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Auth,
    Forbidden,
    NotFound,
    Conflict,
    Dependency,
}

/// Soil service error variants.
#[derive(Debug, thiserror::Error)]
pub enum SoilServiceError {
    // ── Validation ───────────────────────────────────────────────────────
    #[error("unsupported file type; allowed: {allowed}")]
    UnsupportedMediaType { allowed: String },
    #[error("file too large; maximum is {max_bytes} bytes")]
    PayloadTooLarge { max_bytes: u64 },
    #[error("no image uploaded")]
    MissingImage,
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ── Auth ─────────────────────────────────────────────────────────────
    #[error("missing or malformed bearer credential")]
    MalformedCredential,
    #[error("token expired")]
    ExpiredToken,
    #[error("invalid token")]
    MalformedToken,
    #[error("wrong token type")]
    WrongTokenType,
    #[error("user not found")]
    UnknownUser,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("invalid or expired verification code")]
    InvalidCode,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("account is not verified")]
    UnverifiedAccount,

    // ── Not found ────────────────────────────────────────────────────────
    #[error("analysis not found")]
    AnalysisNotFound,
    #[error("image not found")]
    ImageNotFound,

    // ── Conflict ─────────────────────────────────────────────────────────
    #[error("email already registered")]
    EmailAlreadyExists,

    // ── Dependency ───────────────────────────────────────────────────────
    #[error("failed to store image")]
    StorageFailure(#[source] anyhow::Error),
    #[error("soil classification failed")]
    InferenceFailure(#[source] anyhow::Error),
    #[error("failed to save analysis")]
    PersistenceFailure(#[source] anyhow::Error),
    #[error("failed to send verification email")]
    NotificationFailure(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl SoilServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedMediaType { .. }
            | Self::PayloadTooLarge { .. }
            | Self::MissingImage
            | Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::MalformedCredential
            | Self::ExpiredToken
            | Self::MalformedToken
            | Self::WrongTokenType
            | Self::UnknownUser
            | Self::InvalidCredentials
            | Self::InvalidCode
            | Self::InvalidRefreshToken => ErrorCategory::Auth,
            Self::UnverifiedAccount => ErrorCategory::Forbidden,
            Self::AnalysisNotFound | Self::ImageNotFound => ErrorCategory::NotFound,
            Self::EmailAlreadyExists => ErrorCategory::Conflict,
            Self::StorageFailure(_)
            | Self::InferenceFailure(_)
            | Self::PersistenceFailure(_)
            | Self::NotificationFailure(_)
            | Self::Internal(_) => ErrorCategory::Dependency,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::MissingImage => "MISSING_IMAGE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::MalformedCredential => "MALFORMED_CREDENTIAL",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::WrongTokenType => "WRONG_TOKEN_TYPE",
            Self::UnknownUser => "UNKNOWN_USER",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCode => "INVALID_CODE",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::UnverifiedAccount => "UNVERIFIED_ACCOUNT",
            Self::AnalysisNotFound => "ANALYSIS_NOT_FOUND",
            Self::ImageNotFound => "IMAGE_NOT_FOUND",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
            Self::InferenceFailure(_) => "INFERENCE_FAILURE",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::NotificationFailure(_) => "NOTIFICATION_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<soilscan_auth_types::token::TokenError> for SoilServiceError {
    fn from(e: soilscan_auth_types::token::TokenError) -> Self {
        use soilscan_auth_types::token::TokenError;
        match e {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::Malformed => Self::MalformedToken,
            other => Self::Internal(anyhow::Error::new(other).context("token signing")),
        }
    }
}

// ── Extractor rejections ─────────────────────────────────────────────────────

impl From<JsonRejection> for SoilServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for SoilServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for SoilServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for SoilServiceError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for SoilServiceError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
            ErrorCategory::Forbidden => StatusCode::FORBIDDEN,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::Dependency => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and TraceLayer already records them.
        if let Self::StorageFailure(ref e)
        | Self::InferenceFailure(ref e)
        | Self::PersistenceFailure(ref e)
        | Self::NotificationFailure(ref e)
        | Self::Internal(ref e) = self
        {
            tracing::error!(error = format!("{e:#}"), kind = self.kind(), "dependency failure");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
