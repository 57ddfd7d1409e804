use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use soilscan_core::serde::{to_rfc3339_ms, to_rfc3339_ms_opt};
use soilscan_domain::media::ImageFormat;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Persisted result of one soil image classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Name the client uploaded the file under.
    pub image_filename: String,
    /// Storage key under the upload root (`<uuid>.<ext>`).
    pub image_path: String,
    pub soil_type: String,
    pub confidence: f64,
    pub description: String,
    pub characteristics: String,
    pub recommended_crops: String,
    pub recommendations: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn from_prediction(
        user_id: Uuid,
        image_filename: String,
        image_path: String,
        prediction: SoilPrediction,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            image_filename,
            image_path,
            soil_type: prediction.soil_type,
            confidence: prediction.confidence,
            description: prediction.description,
            characteristics: prediction.characteristics,
            recommended_crops: prediction.recommended_crops,
            recommendations: prediction.recommendations,
            created_at: Utc::now(),
        }
    }

    /// Format of the stored image, derived from its storage key.
    pub fn image_format(&self) -> Option<ImageFormat> {
        ImageFormat::extension_of(&self.image_path).and_then(|ext| ext.parse().ok())
    }
}

/// Classifier output plus the advisory text for the predicted label.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilPrediction {
    pub soil_type: String,
    /// Probability of the predicted label, in `[0, 1]`.
    pub confidence: f64,
    pub description: String,
    pub characteristics: String,
    pub recommended_crops: String,
    pub recommendations: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilTypeStats {
    pub soil_type: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilStats {
    pub total_analyses: u64,
    pub soil_types_breakdown: Vec<SoilTypeStats>,
    pub most_common_type: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub latest_analysis_date: Option<DateTime<Utc>>,
}

/// Limits applied to uploaded images before they are stored.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    /// Dotted, lower-case extensions (`.jpg`).
    pub allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Parse a comma-separated extension list (`jpg, .PNG`) into dotted lower-case form.
    pub fn new(max_bytes: u64, allowed: &str) -> Self {
        let allowed_extensions = allowed
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{ext}"))
            .collect();
        Self {
            max_bytes,
            allowed_extensions,
        }
    }

    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }

    /// Dotted extension of `filename` when it is both allowed and a known image format.
    pub fn accepted_extension(&self, filename: &str) -> Option<String> {
        ImageFormat::extension_of(filename)
            .filter(|ext| self.allows(ext) && ext.parse::<ImageFormat>().is_ok())
    }

    pub fn allowed_list(&self) -> String {
        self.allowed_extensions.join(", ")
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES, "jpg,jpeg,png")
    }
}

/// Verification code lifetime in seconds.
pub const VERIFICATION_CODE_TTL_SECS: u64 = 300;

/// Verification code length in decimal digits.
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Number of most recent analyses the stats endpoint aggregates.
pub const STATS_WINDOW: u64 = 1000;

/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
