use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::shared::errors::{ApiError, messages};

/// Integer `{id}` segment of a `/plants/{id}` route.
///
/// Rejects with 400 before the handler runs when the segment is not an
/// integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantId(pub i32);

impl<S> FromRequestParts<S> for PlantId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(messages::INVALID_PLANT_ID))?;

        parse_plant_id(&raw)
            .map(PlantId)
            .ok_or_else(|| ApiError::bad_request(messages::INVALID_PLANT_ID))
    }
}

fn parse_plant_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

impl std::fmt::Display for PlantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plant_id() {
        assert_eq!(parse_plant_id("1"), Some(1));
        assert_eq!(parse_plant_id("0"), Some(0));
        assert_eq!(parse_plant_id("-3"), Some(-3));
        assert_eq!(parse_plant_id("abc"), None);
        assert_eq!(parse_plant_id("1.5"), None);
        assert_eq!(parse_plant_id(""), None);
        assert_eq!(parse_plant_id("99999999999"), None);
    }
}
