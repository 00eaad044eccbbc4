/// Resource services
///
/// The services orchestrate the repositories and the asset store together
/// and are the only layer that keeps a record's image reference and the
/// file on disk in step.

pub mod event;
pub mod news;

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Parse an ISO-ish timestamp string into a UTC instant
///
/// Accepts RFC 3339 ("2030-01-01T18:00:00Z"), a bare datetime interpreted
/// as UTC ("2030-01-01T18:00:00", "2030-01-01 18:00:00"), or a bare date
/// at midnight ("2030-01-01").
pub fn parse_timestamp(input: &str) -> ApiResult<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(ApiError::Validation(format!("invalid date '{}'", input)))
}

/// Reject a missing or blank required field
fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("missing required field '{}'", field)))
}

/// Treat an empty submitted value the same as an omitted one
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Double-option deserializer: distinguishes an absent field (outer None)
/// from an explicit null (inner None) so partial updates can tell "leave
/// the image alone" apart from "clear it".
fn explicit_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Option<String> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
