use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::shared::errors::ApiError;
use crate::shared::extractors::payload::{self, Payload};
use crate::shared::extractors::plant_id::PlantId;
use crate::shared::extractors::request_id::RequestId;
use crate::storage::PlantPatch;

use super::error_recorder::ErrorRecorder;
use super::errors::{Error, HandlerResult};
use super::models::{ErrorResponse, PlantResponse};

const HANDLER_NAME: &str = "update_plant";

/// Partially update a plant
///
/// Only the keys present in the body are written; unknown keys are ignored
/// and an empty object leaves the plant unchanged.
#[utoipa::path(
    patch,
    path = "/plants/{id}",
    params(("id" = i32, Path, description = "Plant id")),
    request_body = PlantPatch,
    responses(
        (status = 200, description = "The updated plant", body = PlantResponse),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "Plant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "plants",
)]
#[tracing::instrument(skip_all, name = "update_plant")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    PlantId(id): PlantId,
    body: Result<Payload<PlantPatch>, payload::Error>,
) -> HandlerResult<(StatusCode, Json<PlantResponse>)> {
    state.metrics.record_request(HANDLER_NAME);
    let recorder =
        ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    // An unknown id answers 404 even when the body is malformed.
    state
        .gateway
        .find_by_id(id)
        .await
        .map_err(|e| recorder.record(Error::Storage(e)))?
        .ok_or_else(|| recorder.record(Error::NotFound(id)))?;

    let Payload(patch) = body.map_err(|e| {
        state.metrics.record_error(HANDLER_NAME, "invalid_body");
        ApiError::from(e).with_request_id(request_id)
    })?;

    tracing::info!(
        plant_id = id,
        request_id = %request_id,
        name = patch.name.as_option().is_some(),
        image = patch.image.as_option().is_some(),
        price = patch.price.as_option().is_some(),
        is_in_stock = patch.is_in_stock.as_option().is_some(),
        "Updating plant",
    );

    let plant = state
        .gateway
        .update(id, patch)
        .await
        .map_err(|e| recorder.record(Error::Storage(e)))?
        .ok_or_else(|| recorder.record(Error::NotFound(id)))?;

    Ok((StatusCode::OK, Json(plant.into())))
}
