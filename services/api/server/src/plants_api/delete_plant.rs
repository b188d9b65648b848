use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::shared::extractors::plant_id::PlantId;
use crate::shared::extractors::request_id::RequestId;

use super::error_recorder::ErrorRecorder;
use super::errors::{Error, HandlerResult};
use super::models::ErrorResponse;

const HANDLER_NAME: &str = "delete_plant";

/// Delete a plant
///
/// Answers 204 with an empty body.
#[utoipa::path(
    delete,
    path = "/plants/{id}",
    params(("id" = i32, Path, description = "Plant id")),
    responses(
        (status = 204, description = "Plant deleted"),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Plant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "plants",
)]
#[tracing::instrument(skip_all, name = "delete_plant")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    PlantId(id): PlantId,
) -> HandlerResult<StatusCode> {
    state.metrics.record_request(HANDLER_NAME);
    let recorder =
        ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let deleted = state
        .gateway
        .delete(id)
        .await
        .map_err(|e| recorder.record(Error::Storage(e)))?;

    if !deleted {
        return Err(recorder.record(Error::NotFound(id)));
    }

    tracing::info!(plant_id = id, request_id = %request_id, "Deleted plant");
    Ok(StatusCode::NO_CONTENT)
}
