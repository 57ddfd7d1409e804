use std::time::Duration;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use soilscan_auth_types::token::TokenService;
use soilscan_core::config::Config;
use soilscan_core::tracing::init_tracing;
use soilscan_soil::config::SoilConfig;
use soilscan_soil::domain::types::UploadPolicy;
use soilscan_soil::infra::inference::{ClassMapping, HttpInferenceEngine};
use soilscan_soil::infra::mailer::{HttpEmailNotifier, LogEmailNotifier, Mailer};
use soilscan_soil::infra::password::PasswordHashing;
use soilscan_soil::infra::storage::FsImageStore;
use soilscan_soil::router::build_router;
use soilscan_soil::state::AppState;
use soilscan_soil_migration::Migrator;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = SoilConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");
    }

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let tokens = TokenService::new(
        &config.jwt_secret,
        &config.jwt_algorithm,
        chrono::Duration::minutes(config.access_token_ttl_minutes),
        chrono::Duration::days(config.refresh_token_ttl_days),
    )
    .expect("invalid token configuration");

    let images = FsImageStore::new(&config.upload_dir);
    images
        .ensure_root()
        .await
        .expect("failed to create upload directory");

    let inference_timeout = Duration::from_secs(config.inference_timeout_secs);
    let mapping = ClassMapping::load(&config.class_mapping_path)
        .await
        .expect("failed to load class mapping");
    let engine = HttpInferenceEngine::new(config.inference_url.clone(), mapping, inference_timeout)
        .expect("failed to build inference client");

    let notify_timeout = Duration::from_secs(config.notify_timeout_secs);
    let mailer = match config.mail_api_key.clone() {
        Some(api_key) => Mailer::Http(
            HttpEmailNotifier::new(
                config.mail_api_url.clone(),
                api_key,
                config.mail_sender.clone(),
                notify_timeout,
            )
            .expect("failed to build mail client"),
        ),
        None => {
            info!("MAIL_API_KEY not set; verification codes will only be logged");
            Mailer::Log(LogEmailNotifier)
        }
    };

    let state = AppState {
        db,
        redis,
        tokens,
        hashing: PasswordHashing::default(),
        images,
        engine,
        mailer,
        upload_policy: UploadPolicy::new(config.max_upload_bytes, &config.allowed_extensions),
        inference_timeout,
        notify_timeout,
        cookie_secure: config.cookie_secure,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.soil_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("soil service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
