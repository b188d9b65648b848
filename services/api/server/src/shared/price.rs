use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

const EXPECTING: &str = "a number or a numeric string";

/// Decimal price carried as a JSON number.
///
/// Input accepts a JSON number or a numeric string. Numbers are read from
/// their literal text and written back from the decimal digits, so no value
/// ever passes through a binary float.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price(pub BigDecimal);

impl From<BigDecimal> for Price {
    fn from(value: BigDecimal) -> Self {
        Price(value)
    }
}

impl FromStr for Price {
    type Err = bigdecimal::ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigDecimal::from_str(s.trim()).map(Price)
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let number =
            Number::from_str(&self.0.to_string()).map_err(|e| {
                serde::ser::Error::custom(format!(
                    "price {} is not a json number: {e}",
                    self.0
                ))
            })?;

        number.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(number) => {
                Price::from_str(&number.to_string()).map_err(de::Error::custom)
            }
            Value::String(text) => Price::from_str(&text).map_err(|_| {
                de::Error::invalid_value(Unexpected::Str(&text), &EXPECTING)
            }),
            Value::Bool(value) => Err(de::Error::invalid_type(
                Unexpected::Bool(value),
                &EXPECTING,
            )),
            Value::Null => {
                Err(de::Error::invalid_type(Unexpected::Unit, &EXPECTING))
            }
            Value::Array(_) => {
                Err(de::Error::invalid_type(Unexpected::Seq, &EXPECTING))
            }
            Value::Object(_) => {
                Err(de::Error::invalid_type(Unexpected::Map, &EXPECTING))
            }
        }
    }
}
