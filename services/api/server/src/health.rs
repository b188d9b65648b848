use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;
use crate::storage::PlantGateway;

const STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Debug)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
}

pub async fn handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage = check_storage(state.gateway.as_ref()).await;

    let overall = if state.shutdown.is_shutting_down()
        || storage.status == HealthStatus::Unhealthy
    {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    };

    let status_code = match overall {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let mut components = HashMap::new();
    components.insert("storage".to_string(), storage);

    (
        status_code,
        Json(HealthResponse {
            status: overall,
            components,
        }),
    )
}

async fn check_storage(gateway: &dyn PlantGateway) -> ComponentHealth {
    let start = Instant::now();
    let result = tokio::time::timeout(STORAGE_TIMEOUT, gateway.ping()).await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    match result {
        Ok(Ok(())) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms,
            error: None,
        },
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "storage health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                latency_ms,
                error: Some("unavailable".to_string()),
            }
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = STORAGE_TIMEOUT.as_secs(),
                "storage health check timed out"
            );
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                latency_ms,
                error: Some("timeout".to_string()),
            }
        }
    }
}
