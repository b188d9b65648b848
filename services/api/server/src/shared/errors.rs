use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

/// Client-visible error messages.
pub mod messages {
    pub const PLANT_NOT_FOUND: &str = "Plant not found";
    pub const INVALID_PLANT_ID: &str = "Invalid plant id";
    pub const ROUTE_NOT_FOUND: &str = "Not Found";
    pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
}

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Error response rendered as `{"error": <message>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status_code: StatusCode,
    message: String,
    request_id: Option<Uuid>,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            request_id: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn plant_not_found() -> Self {
        Self::not_found(messages::PLANT_NOT_FOUND)
    }

    /// The message is fixed; callers log the underlying cause themselves.
    pub fn internal_server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            messages::INTERNAL_SERVER_ERROR,
        )
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            sentry::Hub::with_active(|hub| hub.capture_error(&self));
        }

        let body = Json(json!({ "error": self.message }));
        let mut response = (self.status_code, body).into_response();
        if let Some(request_id) = self.request_id
            && let Ok(value) = HeaderValue::from_str(&request_id.to_string())
        {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        response
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status_code, self.message)
    }
}

impl std::error::Error for ApiError {}
