use anyhow::Context;
use plants_api::metrics::ServerMetrics;
use plants_api::shutdown::{ShutdownCoordinator, listen_for_shutdown_signals};
use plants_api::storage::{InMemoryPlantGateway, PgPlantGateway, PlantGateway};
use plants_api::{AppState, Config, StorageBackend};
use std::sync::Arc;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./../../../db/migrations");

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = setup(config).await {
            tracing::error!("Fatal error during setup: {e:#}");
            std::process::exit(1);
        }
    });
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize tracing filter")?;

    if config.log_format != "pretty" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(true)
            .with_level(true)
            .json();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .pretty();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

async fn connect_postgres(
    config: &Config,
) -> anyhow::Result<postgres_models::connection::Pool> {
    let db_url = config
        .database_url()
        .context("Invalid database configuration")?;

    let db_pool = postgres_models::connection::establish_connection(db_url)
        .await
        .context("Failed to connect to Postgres")?;

    let db_pool_conn = db_pool
        .get_owned()
        .await
        .context("Failed to get connection from pool for migrations")?;

    postgres_models::connection::run_migrations(db_pool_conn, MIGRATIONS)
        .await
        .context("Failed to run database migrations")?;

    Ok(db_pool)
}

async fn setup(config: Config) -> anyhow::Result<()> {
    init_tracing(&config)?;

    let addr: String = format!("0.0.0.0:{}", config.api_service_port);
    tracing::info!(
        backend = ?config.storage_backend,
        "Starting plants-api service at: {addr}"
    );

    let (gateway, db_pool) = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_postgres(&config).await?;
            let gateway: Arc<dyn PlantGateway> =
                Arc::new(PgPlantGateway::new(pool.clone()));
            (gateway, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!(
                "Using the in-memory plant store; data is lost on exit"
            );
            let gateway: Arc<dyn PlantGateway> =
                Arc::new(InMemoryPlantGateway::new());
            (gateway, None)
        }
    };

    let shutdown = Arc::new(ShutdownCoordinator::new(db_pool));
    let metrics = ServerMetrics::new(None)
        .context("Failed to create server metrics")?;

    let app_state = AppState {
        gateway,
        metrics: Arc::new(metrics),
        shutdown: shutdown.clone(),
    };
    let app = plants_api::app(app_state);

    // Spawn shutdown signal handler
    let shutdown_handle = shutdown.clone();
    tokio::spawn(async move {
        listen_for_shutdown_signals().await;
        shutdown_handle.shutdown().await;
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    let shutdown_for_serve = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_for_serve.wait_for_shutdown().await
        })
        .await
        .context("Server exited with error")?;

    Ok(())
}
