//! Room operating windows: turn `openTime`/`closeTime` strings plus a date into
//! a normalized `[open, close)` interval.
//!
//! Rules:
//! - a close time at or before the open time rolls into the next calendar day
//!   (e.g. 22:00 → 02:00);
//! - a close time of `00:00:00` means "until the end of the day" (24:00);
//! - `00:00:00` → `00:00:00` means open around the clock, never a zero-length window.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::EngineConfig;
use crate::dst::resolve_local;
use crate::error::{EngineError, Result};
use crate::interval::Interval;

/// Parse a local time of day (`HH:MM:SS` or `HH:MM`). `24:00` is read as midnight.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let s = raw.trim();
    if s == "24:00" || s == "24:00:00" {
        return Ok(NaiveTime::MIN);
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| EngineError::InvalidTimeOfDay(raw.to_string()))
}

/// Resolve the operating window of a room on `date`.
///
/// # Errors
/// Returns `EngineError::InvalidTimeOfDay` if either string is unparseable, or if an
/// endpoint does not exist on that date under the configured DST policy.
pub fn operating_window(
    open_time: &str,
    close_time: &str,
    date: NaiveDate,
    config: &EngineConfig,
) -> Result<Interval> {
    let open = parse_time_of_day(open_time)?;
    let close = parse_time_of_day(close_time)?;

    let open_local = date.and_time(open);
    // Midnight close, including the 24h sentinel, always means the end of `date`.
    let close_local = if close == NaiveTime::MIN || close <= open {
        (date + Duration::days(1)).and_time(close)
    } else {
        date.and_time(close)
    };

    let resolve = |local: NaiveDateTime| {
        resolve_local(&config.timezone, local, config.dst_policy).ok_or_else(|| {
            EngineError::InvalidTimeOfDay(format!("{} does not exist in {}", local, config.timezone))
        })
    };

    Ok(Interval::new(resolve(open_local)?, resolve(close_local)?))
}

/// The whole local calendar day `[00:00, next 00:00)`.
pub fn day_window(date: NaiveDate, config: &EngineConfig) -> Result<Interval> {
    operating_window("00:00:00", "00:00:00", date, config)
}
