// Module name shadows the `serde` crate; use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, Utc};

/// Serialize `DateTime<Utc>` as integer Unix milliseconds, the unit browser
/// clients compare against `Date.now()`.
pub fn to_unix_millis<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_i64(dt.timestamp_millis())
}

/// Whole seconds from `now` until `deadline`, floored and clamped at zero.
pub fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_milliseconds().max(0).div_euclid(1000)
}
