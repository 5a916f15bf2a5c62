//! Booking charts: the `"start,end|start,end"` wire strings the backend attaches to
//! every desk, parsed once at the boundary into [`Interval`]s.
//!
//! A corrupt entry never blanks out the grid: [`BookingChart::parse`] logs and skips
//! it. [`BookingChart::parse_strict`] and [`parse_entry`] surface the error instead.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::config::EngineConfig;
use crate::dst::resolve_local;
use crate::error::{EngineError, Result};
use crate::interval::{ConflictRule, Interval};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// The confirmed reservations of one desk on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingChart {
    intervals: Vec<Interval>,
}

impl BookingChart {
    pub fn new(mut intervals: Vec<Interval>) -> Self {
        intervals.sort();
        Self { intervals }
    }

    /// Parse a raw chart, skipping (and logging) malformed entries. Empty segments
    /// between pipes are ignored.
    pub fn parse(raw: &str, config: &EngineConfig) -> Self {
        let intervals = segments(raw)
            .filter_map(|entry| match parse_entry(entry, config) {
                Ok(interval) => Some(interval),
                Err(err) => {
                    warn!(%err, "skipping booking chart entry");
                    None
                }
            })
            .collect();
        Self::new(intervals)
    }

    /// Parse a raw chart, failing on the first malformed entry.
    pub fn parse_strict(raw: &str, config: &EngineConfig) -> Result<Self> {
        let intervals = segments(raw)
            .map(|entry| parse_entry(entry, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(intervals))
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether any booking conflicts with `frame`, boundary touches included.
    pub fn is_reserved(&self, frame: &Interval) -> bool {
        self.conflicts(frame, ConflictRule::Touching)
    }

    pub fn conflicts(&self, frame: &Interval, rule: ConflictRule) -> bool {
        self.intervals
            .iter()
            .any(|booking| frame.conflicts(booking, rule))
    }
}

fn segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('|').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse one `start,end` entry.
///
/// # Errors
/// Returns `EngineError::MalformedInterval` if the entry is not two timestamps, either
/// timestamp is unparseable, or the end is not after the start.
pub fn parse_entry(entry: &str, config: &EngineConfig) -> Result<Interval> {
    let malformed = |reason: &str| EngineError::MalformedInterval {
        entry: entry.to_string(),
        reason: reason.to_string(),
    };

    let (start, end) = entry
        .split_once(',')
        .ok_or_else(|| malformed("expected 'start,end'"))?;
    let start = parse_instant(start.trim(), config).ok_or_else(|| malformed("bad start"))?;
    let end = parse_instant(end.trim(), config).ok_or_else(|| malformed("bad end"))?;

    let interval = Interval::new(start, end);
    if interval.is_empty() {
        return Err(malformed("end is not after start"));
    }
    Ok(interval)
}

/// RFC 3339, or a naive timestamp local to the configured timezone.
fn parse_instant(s: &str, config: &EngineConfig) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|local| resolve_local(&config.timezone, local, config.dst_policy))
}
