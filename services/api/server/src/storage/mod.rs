//! Storage gateway for plant records.
//!
//! Handlers only see [`PlantGateway`]; the concrete backend is picked at
//! start-up and injected through [`crate::AppState`].

use async_trait::async_trait;
use postgres_models::connection::WithConnectionError;
pub use postgres_models::models::plants::{NewPlant, Plant};

mod memory;
mod patch;
mod postgres;

pub use memory::InMemoryPlantGateway;
pub use patch::PlantPatch;
pub use postgres::PgPlantGateway;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to get database connection: {0}")]
    Pool(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("In-memory plant store lock poisoned")]
    Poisoned,
}

impl From<WithConnectionError<diesel::result::Error>> for StorageError {
    fn from(err: WithConnectionError<diesel::result::Error>) -> Self {
        match err {
            WithConnectionError::Pool(e) => StorageError::Pool(e.to_string()),
            WithConnectionError::Operation(e) => StorageError::Database(e),
        }
    }
}

#[async_trait]
pub trait PlantGateway: Send + Sync {
    /// Every plant, ordered by id.
    async fn find_all(&self) -> StorageResult<Vec<Plant>>;

    async fn find_by_id(&self, id: i32) -> StorageResult<Option<Plant>>;

    /// Look up, merge and commit as one unit. `Ok(None)` if the id is absent.
    async fn update(
        &self,
        id: i32,
        patch: PlantPatch,
    ) -> StorageResult<Option<Plant>>;

    /// `Ok(false)` if the id is absent.
    async fn delete(&self, id: i32) -> StorageResult<bool>;

    /// Not reachable over HTTP; used for seeding and tests.
    async fn create(&self, plant: NewPlant) -> StorageResult<Plant>;

    async fn ping(&self) -> StorageResult<()>;
}
