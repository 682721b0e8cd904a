//! RFC3339 timestamps with millisecond precision, matching what the web
//! client's `Date` parsing expects. Serialize-only: nothing on this surface
//! accepts a timestamp as input.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}
