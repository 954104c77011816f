use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteforge_core::rate_limit::{FixedWindowLimiter, RateLimitConfig};
use siteforge_media::{
    AiImageConfig, AiImageProvider, ImageChain, ImageProvider, ObjectStorage, StockPhotoConfig,
    StockPhotoProvider, StorageConfig,
};
use siteforge_model::ModelClient;
use siteforge_notify::{EmailConfig, EmailDelivery};

use siteforge_api::config::ServerConfig;
use siteforge_api::router::build_app_router;
use siteforge_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "siteforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = siteforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    siteforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    siteforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Content model ---
    let model = ModelClient::from_env().map(Arc::new);
    match &model {
        Some(client) => {
            tracing::info!(timeout_secs = client.timeout_secs(), "Content model configured")
        }
        None => tracing::warn!("Content model not configured; generation will be unavailable"),
    }

    // --- Object storage ---
    let storage = match StorageConfig::from_env() {
        Some(storage_config) => {
            let storage = Arc::new(ObjectStorage::new(storage_config).await);
            tracing::info!("Object storage configured");
            Some(storage)
        }
        None => {
            tracing::warn!("Object storage not configured; uploads will be unavailable");
            None
        }
    };

    // --- Image acquisition chain ---
    let mut providers: Vec<Box<dyn ImageProvider>> = Vec::new();
    if let (Some(ai_config), Some(storage)) = (AiImageConfig::from_env(), storage.clone()) {
        providers.push(Box::new(AiImageProvider::new(ai_config, storage)));
    }
    if let Some(stock_config) = StockPhotoConfig::from_env() {
        providers.push(Box::new(StockPhotoProvider::new(stock_config)));
    }
    tracing::info!(providers = providers.len() + 1, "Image chain assembled");
    let images = Arc::new(ImageChain::new(providers, config.fallback_image_url.clone()));

    // --- Email ---
    let mailer = EmailConfig::from_env().map(|email_config| {
        tracing::info!(host = %email_config.smtp_host, "Email delivery configured");
        Arc::new(EmailDelivery::new(email_config))
    });
    if mailer.is_none() {
        tracing::warn!("Email delivery not configured; notifications will be skipped");
    }

    // --- State and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        limiter: Arc::new(FixedWindowLimiter::new(RateLimitConfig::default())),
        model,
        images,
        storage,
        mailer,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c");
    tracing::info!("Shutdown signal received");
}
