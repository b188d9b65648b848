use utoipa::OpenApi;

/// OpenAPI documentation for the plant endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::plants_api::list_plants::handler,
        crate::plants_api::get_plant::handler,
        crate::plants_api::update_plant::handler,
        crate::plants_api::delete_plant::handler,
    ),
    components(schemas(
        crate::plants_api::models::PlantResponse,
        crate::plants_api::models::ErrorResponse,
        crate::storage::PlantPatch,
    )),
    info(
        title = "Plants API",
        version = "1.0.0",
        description = "CRUD access to the plant catalog",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "plants", description = "Plant catalog records")
    )
)]
pub struct PlantsApiDoc;

impl PlantsApiDoc {
    pub fn openapi() -> utoipa::openapi::OpenApi {
        <PlantsApiDoc as utoipa::OpenApi>::openapi()
    }

    pub fn openapi_json() -> serde_json::Value {
        serde_json::to_value(Self::openapi()).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize OpenAPI spec: {e}");
            serde_json::Value::Null
        })
    }
}
