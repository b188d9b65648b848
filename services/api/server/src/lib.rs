//! # Plants API Server
//!
use crate::metrics::ServerMetrics;
use crate::shared::errors::{ApiError, messages};
use crate::shutdown::ShutdownCoordinator;
use crate::storage::PlantGateway;
use axum::Router;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};

mod plants_api;
pub mod shutdown;

pub mod openapi;

pub mod health;
pub mod metrics;
pub mod shared;
pub mod storage;

pub use plants_api::get_routes as get_plants_routes;

const VERSION: Option<&'static str> = option_env!("VERSION");

/// Serves the OpenAPI document for the plant endpoints.
pub fn get_openapi_routes() -> Router {
    use axum::Json;
    use axum::routing::get;

    async fn openapi_handler() -> Json<serde_json::Value> {
        Json(openapi::PlantsApiDoc::openapi_json())
    }

    Router::new().route("/api-docs/openapi.json", get(openapi_handler))
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found(messages::ROUTE_NOT_FOUND)
}

/// The full HTTP application: plant routes, operational endpoints and the
/// tower-http layers.
pub fn app(state: AppState) -> Router {
    use axum::routing::get;

    let operational = Router::new()
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .with_state(state.clone());

    Router::new()
        .route(
            "/version",
            get(|| async { VERSION.unwrap_or("unknown") }),
        )
        .merge(operational)
        .merge(get_plants_routes(state))
        .merge(get_openapi_routes())
        .fallback(fallback_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
}

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PlantGateway>,
    pub metrics: Arc<ServerMetrics>,
    pub shutdown: Arc<ShutdownCoordinator>,
}

impl AppState {
    /// State with fresh metrics and a shutdown coordinator that owns no
    /// database pool.
    pub fn new(gateway: Arc<dyn PlantGateway>) -> prometheus::Result<Self> {
        Ok(Self {
            gateway,
            metrics: Arc::new(ServerMetrics::new(None)?),
            shutdown: Arc::new(ShutdownCoordinator::new(None)),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "set DATABASE_URL, or DATABASE_CREDENTIALS and DATABASE_RW_ENDPOINT"
    )]
    MissingDatabaseSettings,

    #[error("DATABASE_CREDENTIALS must be valid json: {0}")]
    InvalidCredentials(#[from] serde_json::Error),
}

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    // Service port
    #[serde(default = "default_api_service_port")]
    pub api_service_port: String,

    // Loggers
    #[serde(default)]
    pub log_format: String,
    #[serde(default)]
    pub sentry_dsn: Option<String>,

    // Storage
    #[serde(default)]
    pub storage_backend: StorageBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub database_credentials: Option<String>,
    #[serde(default)]
    pub database_rw_endpoint: Option<String>,
    #[serde(default = "default_database_name")]
    pub database_name: String,
}

fn default_api_service_port() -> String {
    "5555".to_string()
}

fn default_database_name() -> String {
    "plants".to_string()
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        // Load .env file if present (useful when running outside docker-compose)
        match dotenv::dotenv() {
            Ok(path) => eprintln!("Loaded .env from: {}", path.display()),
            Err(e) => eprintln!("dotenv warning: {e}"),
        }

        envy::from_env::<Config>()
    }

    /// `DATABASE_URL` wins; otherwise the url is assembled from the
    /// credentials json and the read-write endpoint.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let (Some(credentials), Some(endpoint)) =
            (&self.database_credentials, &self.database_rw_endpoint)
        else {
            return Err(ConfigError::MissingDatabaseSettings);
        };

        let creds = serde_json::from_str::<
            postgres_models::connection::Credentials,
        >(credentials)?;
        let db_username = creds.username;
        let db_password = creds.password;
        let db_name = &self.database_name;

        Ok(format!(
            "postgresql://{db_username}:{db_password}@{endpoint}:5432/{db_name}"
        ))
    }
}
