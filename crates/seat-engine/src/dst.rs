//! DST policies for resolving local wall-clock times into instants.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for local times that fall into a DST gap (e.g. 02:30 during spring forward).
///
/// Ambiguous local times (fall back) always resolve to the earliest instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// The local time has no instant; callers treat it as unresolvable.
    Skip,
    /// Move forward past the gap to the first valid wall-clock time.
    #[default]
    ShiftForward,
}

/// Resolve a local wall-clock time in `tz` into a UTC instant.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => {
                // Gaps are at most a couple of hours wide; probe in 15-minute steps.
                (1..=12).find_map(|step| {
                    tz.from_local_datetime(&(local + Duration::minutes(15 * step)))
                        .earliest()
                        .map(|dt| dt.with_timezone(&Utc))
                })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn seoul_has_a_single_offset() {
        let tz: Tz = "Asia/Seoul".parse().unwrap();
        let dt = resolve_local(&tz, local(2026, 3, 8, 2, 30), DstPolicy::Skip).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 7, 17, 30, 0).unwrap());
    }

    #[test]
    fn gap_skip_returns_none() {
        // 2026-03-08 02:30 does not exist in New York.
        let tz: Tz = "America/New_York".parse().unwrap();
        assert!(resolve_local(&tz, local(2026, 3, 8, 2, 30), DstPolicy::Skip).is_none());
    }

    #[test]
    fn gap_shift_forward_lands_after_gap() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = resolve_local(&tz, local(2026, 3, 8, 2, 30), DstPolicy::ShiftForward).unwrap();
        // 03:00 EDT == 07:00 UTC
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 8, 7, 0, 0).unwrap());
    }

    #[test]
    fn ambiguous_resolves_to_earliest() {
        // 2026-11-01 01:30 happens twice in New York; EDT comes first.
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = resolve_local(&tz, local(2026, 11, 1, 1, 30), DstPolicy::Skip).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }
}
