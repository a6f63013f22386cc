//! Lenient (de)serialization for upstream local date-times.
//!
//! The authority service emits ISO local date-times with or without seconds
//! (`2030-01-01T20:00` and `2030-01-01T20:00:00.000` are both valid).

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn parse_local_date_time(value: &str) -> Option<NaiveDateTime> {
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
}

pub mod option_local_date_time {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) => parse_local_date_time(&value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid local date-time '{}'", value))),
        }
    }
}
