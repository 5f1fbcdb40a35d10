pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::services::notifications::Notifier;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub notifier: Notifier,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::connect(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");

        db.migrate().await?;

        let redis = redis_client::RedisClient::connect(&config.redis.url).await?;
        info!("Redis connected, email queue: {}", config.redis.email_queue_key);

        let notifier = Notifier::new(
            redis,
            config.redis.email_queue_key.clone(),
            config.mail.default_from_email.clone(),
        );

        Ok(Arc::new(Self { db, notifier, config }))
    }
}

/// Полный роутер приложения: служебные маршруты + API под /api
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Theatre Booking API v1.0" }))
        .route("/health", get(health))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    if state.db.is_reachable().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}
