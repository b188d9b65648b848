use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio_postgres::Client as TokioPgClient;
use tracing::Instrument;
use tracing::{info, instrument, warn};

pub type Pool = bb8::Pool<AsyncPgConnection>;
pub type PooledConnection = bb8::PooledConnection<'static, AsyncPgConnection>;

pub const MAX_POOL_SIZE: u32 = 50;
pub const MIN_RESERVED_CONNECTIONS: u32 = 10;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migrations must run inside a Tokio runtime")]
    NoRuntime,

    #[error("migration task failed: {0}")]
    Join(#[from] task::JoinError),

    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

async fn create_tokio_pg_client(
    db_url: &str,
) -> Result<TokioPgClient, tokio_postgres::Error> {
    let (client, connection) =
        tokio_postgres::connect(db_url, tokio_postgres::NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

async fn get_max_connections(
    client: &TokioPgClient,
) -> Result<i32, anyhow::Error> {
    let row = client
        .query_one("SELECT current_setting('max_connections')", &[])
        .await?;

    let max_conn_str: String = row.get(0);
    max_conn_str.parse().map_err(|e| {
        anyhow::anyhow!(
            "Failed to parse max_connections '{}': {}",
            max_conn_str,
            e
        )
    })
}

fn calculate_optimal_pool_size(
    db_max_connections: i32,
    num_app_instances: u32,
    reserved_for_admin: u32,
) -> u32 {
    let available =
        db_max_connections.saturating_sub(reserved_for_admin as i32);
    if available <= 0 || num_app_instances == 0 {
        return 1;
    }

    let per_instance =
        (available as f32 / num_app_instances as f32).floor() as u32;

    per_instance.clamp(1, MAX_POOL_SIZE)
}

/// Build a bb8 pool sized against the server's `max_connections` and check
/// it with a `SELECT 1`.
pub async fn establish_connection(
    db_url: String,
) -> Result<Pool, anyhow::Error> {
    let client = create_tokio_pg_client(&db_url).await.map_err(|e| {
        anyhow::anyhow!("Failed to create PostgreSQL tokio client: {}", e)
    })?;

    let max_conn = get_max_connections(&client).await?;
    info!("PostgreSQL max_connections: {}", max_conn);

    let max_pool_size =
        calculate_optimal_pool_size(max_conn, 1, MIN_RESERVED_CONNECTIONS);
    info!("PostgreSQL max_pool_size: {}", max_pool_size);

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    let pool = bb8::Pool::builder()
        .max_size(max_pool_size)
        .connection_timeout(Duration::from_secs(10))
        .idle_timeout(Some(Duration::from_secs(180)))
        .retry_connection(true)
        .max_lifetime(Some(Duration::from_secs(3600)))
        .build(config)
        .await?;

    let mut conn = pool.get_owned().await?;
    diesel::sql_query("SELECT 1").execute(&mut conn).await?;

    Ok(pool)
}

#[instrument(skip(pool))]
pub async fn shutdown_pool_with_timeout(
    pool: Arc<Pool>,
    shutdown_timeout: Duration,
) {
    info!("Starting graceful PostgreSQL pool shutdown with timeout");

    let state = pool.state();
    let active = state.connections - state.idle_connections;
    info!(
        total = state.connections,
        idle = state.idle_connections,
        active,
        "Current pool state"
    );

    if active > 0 {
        warn!("Waiting for {} active database connections to finish", active);

        let start = tokio::time::Instant::now();
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;

            let current = pool.state();
            let active = current.connections - current.idle_connections;

            if active == 0 {
                info!("All database connections are now idle");
                break;
            }

            if start.elapsed() > shutdown_timeout {
                warn!(
                    "Shutdown timeout reached with {} active connections remaining",
                    active
                );
                break;
            }
        }
    }

    drop(pool);

    info!("PostgreSQL pool shutdown complete");
}

pub async fn run_migrations<A>(
    async_connection: A,
    migrations: EmbeddedMigrations,
) -> Result<(), MigrationError>
where
    A: AsyncConnection<Backend = Pg> + 'static,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return Err(MigrationError::NoRuntime);
    }

    let mut async_wrapper: AsyncConnectionWrapper<A> =
        AsyncConnectionWrapper::from(async_connection);

    task::spawn_blocking(move || {
        async_wrapper
            .run_pending_migrations(migrations)
            .map(|applied| applied.len())
            .map_err(|e| MigrationError::Apply(e.to_string()))
    })
    .await?
    .map(|applied| info!(applied, "Database migrations applied"))
}

/// Run `operation` with a connection taken from the pool for the duration of
/// the call only.
///
/// Emits an `acquiring_pooled_connection` span around the checkout and a
/// `holding_db_connection` span around the operation.
pub async fn with_connection<F, Fut, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: FnOnce(PooledConnection) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let pool_state_before = pool.state();
    let acquire_span = tracing::info_span!(
        "acquiring_pooled_connection",
        pool.connections = pool_state_before.connections,
        pool.idle_connections = pool_state_before.idle_connections,
    );

    let conn =
        async { pool.get_owned().await.map_err(WithConnectionError::Pool) }
            .instrument(acquire_span)
            .await?;

    let hold_span = tracing::info_span!("holding_db_connection");
    let result = async {
        operation(conn)
            .await
            .map_err(WithConnectionError::Operation)
    }
    .instrument(hold_span)
    .await;

    let pool_state_after = pool.state();
    tracing::debug!(
        pool.connections = pool_state_after.connections,
        pool.idle_connections = pool_state_after.idle_connections,
        "connection_returned_to_pool"
    );

    result
}

/// Distinguishes a failed pool checkout from a failed database operation.
#[derive(Debug)]
pub enum WithConnectionError<E> {
    Pool(diesel_async::pooled_connection::bb8::RunError),
    Operation(E),
}

impl<E: std::fmt::Display> std::fmt::Display for WithConnectionError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithConnectionError::Pool(e) => {
                write!(f, "Failed to acquire connection: {}", e)
            }
            WithConnectionError::Operation(e) => {
                write!(f, "Database operation failed: {}", e)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error
    for WithConnectionError<E>
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WithConnectionError::Pool(e) => Some(e),
            WithConnectionError::Operation(e) => Some(e),
        }
    }
}

/// Run `operation` inside a single transaction: commit when it returns `Ok`,
/// roll back otherwise.
pub async fn with_transaction<F, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: for<'c> FnOnce(
            &'c mut AsyncPgConnection,
        ) -> futures::future::BoxFuture<'c, Result<T, E>>
        + Send,
    T: Send,
    E: From<diesel::result::Error> + std::error::Error + Send,
{
    with_connection(pool, |mut conn| async move {
        let txn_span = tracing::info_span!("database_transaction");

        async {
            let result = conn
                .transaction::<T, E, _>(|txn_conn| {
                    Box::pin(operation(txn_conn))
                })
                .await;

            match &result {
                Ok(_) => tracing::debug!("transaction_committed"),
                Err(e) => {
                    tracing::error!(error = %e, "transaction_rolled_back")
                }
            }

            result
        }
        .instrument(txn_span)
        .await
    })
    .await
}
