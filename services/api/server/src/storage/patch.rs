use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

use crate::shared::patch::Patch;
use crate::shared::price::Price;

use super::Plant;

/// Partial update of a plant. Keys absent from the body leave the stored
/// value untouched; unknown keys are ignored.
///
/// Only a JSON object is accepted.
#[derive(Debug, Clone, Default, PartialEq, ToSchema)]
pub struct PlantPatch {
    #[schema(value_type = Option<String>, example = "Fern")]
    pub name: Patch<String>,

    #[schema(value_type = Option<String>, example = "images/fern.png")]
    pub image: Patch<String>,

    #[schema(value_type = Option<f64>, example = 12.5)]
    pub price: Patch<Price>,

    #[schema(value_type = Option<bool>, example = true)]
    pub is_in_stock: Patch<bool>,
}

// Derived struct visitors also take a sequence and fill fields by position,
// so the derive lives here and is only ever fed a map.
#[derive(Deserialize)]
struct PatchFields {
    #[serde(default)]
    name: Patch<String>,
    #[serde(default)]
    image: Patch<String>,
    #[serde(default)]
    price: Patch<Price>,
    #[serde(default)]
    is_in_stock: Patch<bool>,
}

struct PlantPatchVisitor;

impl<'de> Visitor<'de> for PlantPatchVisitor {
    type Value = PlantPatch;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, map: A) -> Result<PlantPatch, A::Error>
    where
        A: MapAccess<'de>,
    {
        let PatchFields {
            name,
            image,
            price,
            is_in_stock,
        } = PatchFields::deserialize(MapAccessDeserializer::new(map))?;

        Ok(PlantPatch {
            name,
            image,
            price,
            is_in_stock,
        })
    }
}

impl<'de> Deserialize<'de> for PlantPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PlantPatchVisitor)
    }
}

impl PlantPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_missing()
            && self.image.is_missing()
            && self.price.is_missing()
            && self.is_in_stock.is_missing()
    }

    pub fn apply(&self, plant: &mut Plant) {
        self.name.merge_into(&mut plant.name);
        self.image.merge_into(&mut plant.image);
        if let Patch::Set(Price(price)) = &self.price {
            plant.price = price.clone();
        }
        self.is_in_stock.merge_into(&mut plant.is_in_stock);
    }
}
