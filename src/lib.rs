pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use axum::{
    http::StatusCode,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use cache::CacheService;
use config::Config;
use database::Database;
use redis_client::RedisClient;
use services::auth::{PasswordHasher, TokenService};
use store::{OrderStore, PgReservationStore, SeatAvailability};

// Shared state for the whole application
pub struct AppState {
    pub db: Database,
    pub orders: Arc<dyn OrderStore>,
    pub availability: Arc<dyn SeatAvailability>,
    pub cache: Option<CacheService>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    pub config: Config,
}

impl AppState {
    /// Connects to Postgres (running pending migrations) and, when configured, Redis.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let db = Database::new(&config.database.url, config.database.pool_size).await?;
        db.run_migrations().await?;

        // The seat cache is optional; a dead Redis only costs us the cache.
        let cache = match &config.redis.url {
            Some(url) => match RedisClient::connect(url).await {
                Ok(redis) => Some(CacheService::new(redis, config.redis.seats_ttl_seconds)),
                Err(e) => {
                    tracing::warn!("redis unavailable, seat cache disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        let store = Arc::new(PgReservationStore::new(db.pool.clone()));
        Ok(Self::with_stores(config, db, store.clone(), store, cache))
    }

    /// Assembles state around already built reservation backends.
    pub fn with_stores(
        config: Config,
        db: Database,
        orders: Arc<dyn OrderStore>,
        availability: Arc<dyn SeatAvailability>,
        cache: Option<CacheService>,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            orders,
            availability,
            cache,
            tokens: TokenService::new(&config.jwt),
            passwords: PasswordHasher::new(config.security.bcrypt_cost),
            config,
        })
    }
}

/// Full HTTP application: service routes, the `/api` tree and the middleware stack.
pub fn app(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.app.request_timeout_seconds);

    Router::new()
        .route("/", get(|| async { "Tickitz API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .fallback(not_found)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(map_response(timeout_envelope))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "route not found" })),
    )
}

// The timeout layer answers with a bare 408; give it the API's error body.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    (
        StatusCode::REQUEST_TIMEOUT,
        Json(json!({ "success": false, "message": "request timed out" })),
    )
        .into_response()
}
