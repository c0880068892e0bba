use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, AuthConfig},
    database,
    error::{AppError, Result},
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(db: PgPool, auth: AuthConfig) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
        }
    }
}

/// Routes with state applied, without transport layers.
pub fn router(state: AppState) -> Router {
    routes::create_router(&state).with_state(state)
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    let state = AppState::new(pool, config.auth.clone());

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
