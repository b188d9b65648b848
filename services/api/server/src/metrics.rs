use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::AppState;

#[derive(Clone, Debug)]
pub struct ServerMetrics {
    pub registry: Registry,

    pub plant_requests: IntCounterVec,
    pub request_errors: IntCounterVec,
}

impl ServerMetrics {
    pub fn new(prefix: Option<String>) -> prometheus::Result<Self> {
        let registry = Registry::new_custom(prefix, None)?;

        let plant_requests = IntCounterVec::new(
            Opts::new(
                "plant_requests",
                "A metric counting plant requests by handler",
            ),
            &["handler"],
        )?;
        let request_errors = IntCounterVec::new(
            Opts::new(
                "request_errors",
                "A metric counting request errors by handler and error code",
            ),
            &["handler", "error_code"],
        )?;

        registry.register(Box::new(plant_requests.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            plant_requests,
            request_errors,
        })
    }

    pub fn record_request(&self, handler: &str) {
        self.plant_requests.with_label_values(&[handler]).inc();
    }

    pub fn record_error(&self, handler: &str, error_code: &str) {
        self.request_errors
            .with_label_values(&[handler, error_code])
            .inc();
    }

    /// Prometheus text exposition of everything in the registry.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("could not encode prometheus metrics: {}", e);
        }

        match String::from_utf8(buffer) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    "prometheus metrics could not be from_utf8'd: {}",
                    e
                );
                String::default()
            }
        }
    }
}

pub async fn handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}
