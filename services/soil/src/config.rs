use std::path::PathBuf;

use serde::Deserialize;

use soilscan_core::config::Config;

/// Soil service configuration, read from the environment by field name
/// (`database_url` ← `DATABASE_URL`).
#[derive(Debug, Clone, Deserialize)]
pub struct SoilConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// HMAC secret for signing access and refresh tokens.
    pub jwt_secret: String,
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
    #[serde(default = "default_access_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_token_ttl_days: i64,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Comma-separated, e.g. `jpg,jpeg,png`.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: String,

    /// Model server endpoint that accepts raw image bytes.
    pub inference_url: String,
    #[serde(default = "default_class_mapping_path")]
    pub class_mapping_path: PathBuf,
    #[serde(default = "default_inference_timeout_secs")]
    pub inference_timeout_secs: u64,

    /// Transactional mail endpoint. Mail is only logged when `mail_api_key` is unset.
    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,
    pub mail_api_key: Option<String>,
    #[serde(default = "default_mail_sender")]
    pub mail_sender: String,
    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// TCP port to listen on. Env var: `SOIL_PORT`.
    #[serde(default = "default_soil_port")]
    pub soil_port: u16,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Config for SoilConfig {}

fn default_jwt_algorithm() -> String {
    "HS256".to_owned()
}

fn default_access_ttl_minutes() -> i64 {
    30
}

fn default_refresh_ttl_days() -> i64 {
    7
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> u64 {
    crate::domain::types::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_allowed_extensions() -> String {
    "jpg,jpeg,png".to_owned()
}

fn default_class_mapping_path() -> PathBuf {
    crate::infra::inference::default_mapping_path()
}

fn default_inference_timeout_secs() -> u64 {
    60
}

fn default_mail_api_url() -> String {
    "https://api.brevo.com/v3/smtp/email".to_owned()
}

fn default_mail_sender() -> String {
    "no-reply@soilscan.local".to_owned()
}

fn default_notify_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_soil_port() -> u16 {
    8000
}
