use serde::{Deserialize, Deserializer};

/// A field of a merge-patch body: either absent from the payload or set to
/// a value.
///
/// Use with `#[serde(default)]` so that a missing key becomes
/// [`Patch::Missing`]. A present key must deserialize as `T`, so `null` is
/// only accepted when `T` accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Missing => None,
            Patch::Set(value) => Some(value),
        }
    }
}

impl<T: Clone> Patch<T> {
    /// Overwrite `target` if the field was present in the payload.
    pub fn merge_into(&self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value.clone();
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        note: Patch<Option<String>>,
    }

    #[test]
    fn test_absent_key_is_missing() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.name.is_missing());
        assert!(body.note.is_missing());
    }

    #[test]
    fn test_present_key_is_set() {
        let body: Body =
            serde_json::from_str(r#"{"name": "Fern", "note": null}"#).unwrap();
        assert_eq!(body.name, Patch::Set("Fern".to_string()));
        assert_eq!(body.note, Patch::Set(None));
    }

    #[test]
    fn test_null_is_rejected_for_non_nullable_field() {
        let result = serde_json::from_str::<Body>(r#"{"name": null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_into_only_touches_set_fields() {
        let mut value = "Fern".to_string();
        Patch::<String>::Missing.merge_into(&mut value);
        assert_eq!(value, "Fern");

        Patch::Set("Cactus".to_string()).merge_into(&mut value);
        assert_eq!(value, "Cactus");
    }
}
