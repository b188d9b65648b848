use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{
    NewPlant, Plant, PlantGateway, PlantPatch, StorageError, StorageResult,
};

/// Process-local gateway for development and tests.
///
/// Ids come from a counter that only moves forward, so a deleted id is
/// never handed out again.
#[derive(Debug, Default)]
pub struct InMemoryPlantGateway {
    inner: RwLock<Store>,
}

#[derive(Debug, Default)]
struct Store {
    plants: BTreeMap<i32, Plant>,
    last_id: i32,
}

impl InMemoryPlantGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlantGateway for InMemoryPlantGateway {
    async fn find_all(&self) -> StorageResult<Vec<Plant>> {
        let store = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        Ok(store.plants.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> StorageResult<Option<Plant>> {
        let store = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        Ok(store.plants.get(&id).cloned())
    }

    async fn update(
        &self,
        id: i32,
        patch: PlantPatch,
    ) -> StorageResult<Option<Plant>> {
        let mut store =
            self.inner.write().map_err(|_| StorageError::Poisoned)?;
        Ok(store.plants.get_mut(&id).map(|plant| {
            patch.apply(plant);
            plant.clone()
        }))
    }

    async fn delete(&self, id: i32) -> StorageResult<bool> {
        let mut store =
            self.inner.write().map_err(|_| StorageError::Poisoned)?;
        Ok(store.plants.remove(&id).is_some())
    }

    async fn create(&self, plant: NewPlant) -> StorageResult<Plant> {
        let mut store =
            self.inner.write().map_err(|_| StorageError::Poisoned)?;
        store.last_id += 1;

        let plant = Plant {
            id: store.last_id,
            name: plant.name,
            image: plant.image,
            price: plant.price,
            is_in_stock: plant.is_in_stock,
        };
        store.plants.insert(plant.id, plant.clone());

        Ok(plant)
    }

    async fn ping(&self) -> StorageResult<()> {
        self.inner
            .read()
            .map(|_| ())
            .map_err(|_| StorageError::Poisoned)
    }
}
