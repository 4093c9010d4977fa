//! Bitbucket timestamp parsing.
//!
//! Bitbucket emits microsecond timestamps with a numeric offset,
//! e.g. `2023-05-04T12:34:56.123456+00:00`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Parses a Bitbucket timestamp into UTC.
///
/// # Errors
///
/// Returns a [`chrono::ParseError`] if the text doesn't match the format.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(text, FORMAT).map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|text| parse_timestamp(&text).map_err(serde::de::Error::custom))
        .transpose()
}
