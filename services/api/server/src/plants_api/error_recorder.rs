use uuid::Uuid;

use crate::metrics::ServerMetrics;
use crate::shared::errors::ApiError;

/// Handler error types that map onto an [`ApiError`] response.
pub trait IntoApiError {
    /// Label used for the `request_errors` counter.
    fn code(&self) -> &'static str;

    fn into_api_error(self) -> ApiError;
}

/// Records error metrics and converts handler errors to [`ApiError`].
pub struct ErrorRecorder<'a> {
    metrics: &'a ServerMetrics,
    handler_name: &'a str,
    request_id: &'a Uuid,
}

impl<'a> ErrorRecorder<'a> {
    pub fn new(
        metrics: &'a ServerMetrics,
        handler_name: &'a str,
        request_id: &'a Uuid,
    ) -> Self {
        Self {
            metrics,
            handler_name,
            request_id,
        }
    }

    pub fn record<E: IntoApiError>(&self, e: E) -> ApiError {
        let code = e.code();
        self.metrics.record_error(self.handler_name, code);
        tracing::info!(
            handler = self.handler_name,
            request_id = %self.request_id,
            error_code = code,
            "plant request failed",
        );
        e.into_api_error().with_request_id(*self.request_id)
    }
}
