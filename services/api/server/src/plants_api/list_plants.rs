use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::shared::extractors::request_id::RequestId;

use super::error_recorder::ErrorRecorder;
use super::errors::{Error, HandlerResult};
use super::models::{ErrorResponse, PlantResponse};

const HANDLER_NAME: &str = "list_plants";

/// List all plants
///
/// Returns every plant in storage order. Query parameters are ignored.
#[utoipa::path(
    get,
    path = "/plants",
    responses(
        (status = 200, description = "All plants", body = Vec<PlantResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "plants",
)]
#[tracing::instrument(skip_all, name = "list_plants")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
) -> HandlerResult<(StatusCode, Json<Vec<PlantResponse>>)> {
    state.metrics.record_request(HANDLER_NAME);
    let recorder =
        ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let plants = state
        .gateway
        .find_all()
        .await
        .map_err(|e| recorder.record(Error::Storage(e)))?;

    tracing::debug!(count = plants.len(), request_id = %request_id, "Listed plants");

    let plants = plants.into_iter().map(PlantResponse::from).collect();
    Ok((StatusCode::OK, Json(plants)))
}
