use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use futures::FutureExt;
use postgres_models::connection::{Pool, with_connection, with_transaction};

use super::{
    NewPlant, Plant, PlantGateway, PlantPatch, StorageError, StorageResult,
};

/// Postgres-backed gateway; every call checks a connection out of the pool
/// for its own duration only.
#[derive(Clone)]
pub struct PgPlantGateway {
    pool: Pool,
}

impl PgPlantGateway {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlantGateway for PgPlantGateway {
    async fn find_all(&self) -> StorageResult<Vec<Plant>> {
        with_connection(&self.pool, |mut conn| async move {
            Plant::find_all(&mut conn).await
        })
        .await
        .map_err(StorageError::from)
    }

    async fn find_by_id(&self, id: i32) -> StorageResult<Option<Plant>> {
        with_connection(&self.pool, |mut conn| async move {
            Plant::find_by_id(id, &mut conn).await
        })
        .await
        .map_err(StorageError::from)
    }

    async fn update(
        &self,
        id: i32,
        patch: PlantPatch,
    ) -> StorageResult<Option<Plant>> {
        with_transaction::<_, _, diesel::result::Error>(
            &self.pool,
            move |conn| {
                async move {
                    let Some(mut plant) =
                        Plant::find_by_id_for_update(id, conn).await?
                    else {
                        return Ok(None);
                    };

                    if patch.is_empty() {
                        return Ok(Some(plant));
                    }

                    patch.apply(&mut plant);
                    plant.save(conn).await.map(Some)
                }
                .boxed()
            },
        )
        .await
        .map_err(StorageError::from)
    }

    async fn delete(&self, id: i32) -> StorageResult<bool> {
        with_connection(&self.pool, |mut conn| async move {
            Plant::delete(id, &mut conn).await
        })
        .await
        .map(|deleted| deleted > 0)
        .map_err(StorageError::from)
    }

    async fn create(&self, plant: NewPlant) -> StorageResult<Plant> {
        with_connection(&self.pool, |mut conn| async move {
            Plant::create(plant, &mut conn).await
        })
        .await
        .map_err(StorageError::from)
    }

    async fn ping(&self) -> StorageResult<()> {
        with_connection(&self.pool, |mut conn| async move {
            diesel::sql_query("SELECT 1").execute(&mut conn).await
        })
        .await
        .map(|_| ())
        .map_err(StorageError::from)
    }
}
