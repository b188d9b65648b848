use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::shared::extractors::plant_id::PlantId;
use crate::shared::extractors::request_id::RequestId;

use super::error_recorder::ErrorRecorder;
use super::errors::{Error, HandlerResult};
use super::models::{ErrorResponse, PlantResponse};

const HANDLER_NAME: &str = "get_plant";

/// Get a plant by id
#[utoipa::path(
    get,
    path = "/plants/{id}",
    params(("id" = i32, Path, description = "Plant id")),
    responses(
        (status = 200, description = "The plant", body = PlantResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Plant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "plants",
)]
#[tracing::instrument(skip_all, name = "get_plant")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    PlantId(id): PlantId,
) -> HandlerResult<(StatusCode, Json<PlantResponse>)> {
    state.metrics.record_request(HANDLER_NAME);
    let recorder =
        ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let plant = state
        .gateway
        .find_by_id(id)
        .await
        .map_err(|e| recorder.record(Error::Storage(e)))?
        .ok_or_else(|| recorder.record(Error::NotFound(id)))?;

    Ok((StatusCode::OK, Json(plant.into())))
}
