use serde::Serialize;
use utoipa::ToSchema;

use crate::shared::price::Price;
use crate::storage::Plant;

/// A plant as returned to clients. Always exactly these five fields.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlantResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Fern")]
    pub name: String,
    #[schema(example = "images/fern.png")]
    pub image: String,
    #[schema(value_type = f64, example = 9.99)]
    pub price: Price,
    #[schema(example = true)]
    pub is_in_stock: bool,
}

impl From<Plant> for PlantResponse {
    fn from(plant: Plant) -> Self {
        Self {
            id: plant.id,
            name: plant.name,
            image: plant.image,
            price: Price(plant.price),
            is_in_stock: plant.is_in_stock,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Plant not found")]
    pub error: String,
}
