//! Tests for booking chart parsing and desk reservation checks.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Asia::Seoul;
use seat_engine::chart::parse_entry;
use seat_engine::interval::{ConflictRule, Interval};
use seat_engine::{BookingChart, DeskBookingRecord, EngineConfig, EngineError, RawDeskBooking, RoomDescriptor};

fn kst(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Seoul
        .with_ymd_and_hms(year, month, day, hour, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn frame(hour: u32, min: u32) -> Interval {
    Interval::starting_at(kst(2026, 3, 16, hour, min), 30)
}

fn raw_desk(desk_no: u32, chart: &str) -> RawDeskBooking {
    RawDeskBooking {
        room_code: "R1".to_string(),
        desk_code: format!("R1-{}", desk_no),
        desk_no,
        date: "2026-03-16".to_string(),
        is_booked_now: false,
        booking_chart: chart.to_string(),
    }
}

fn room_with_fixed(fixed: &[u32]) -> RoomDescriptor {
    serde_json::from_value(serde_json::json!({
        "roomCode": "R1",
        "roomName": "Reading Room",
        "openTime": "09:00:00",
        "closeTime": "18:00:00",
        "fixedDeskNumbers": fixed,
    }))
    .unwrap()
}

#[test]
fn parses_pipe_delimited_pairs() {
    let config = EngineConfig::default();
    let chart = BookingChart::parse(
        "2026-03-16 10:00:00,2026-03-16 10:30:00|2026-03-16 14:00:00,2026-03-16 15:00:00",
        &config,
    );

    assert_eq!(chart.intervals().len(), 2);
    assert_eq!(chart.intervals()[0].start, kst(2026, 3, 16, 10, 0));
    assert_eq!(chart.intervals()[1].end, kst(2026, 3, 16, 15, 0));
}

#[test]
fn empty_segments_are_ignored() {
    let config = EngineConfig::default();
    let chart = BookingChart::parse("|2026-03-16 10:00:00,2026-03-16 10:30:00||", &config);

    assert_eq!(chart.intervals().len(), 1);
    assert!(BookingChart::parse("", &config).is_empty());
}

#[test]
fn malformed_entries_are_skipped_not_fatal() {
    let config = EngineConfig::default();
    let chart = BookingChart::parse(
        "garbage|2026-03-16 10:00:00,2026-03-16 10:30:00|2026-13-40 10:00:00,2026-03-16 11:00:00|2026-03-16 12:00:00,2026-03-16 11:00:00",
        &config,
    );

    assert_eq!(chart.intervals().len(), 1, "only the valid entry survives");
}

#[test]
fn strict_parse_reports_the_bad_entry() {
    let config = EngineConfig::default();
    let err = BookingChart::parse_strict("2026-03-16 10:00:00,oops", &config).unwrap_err();

    match err {
        EngineError::MalformedInterval { entry, .. } => {
            assert_eq!(entry, "2026-03-16 10:00:00,oops")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn accepts_rfc3339_and_iso_local_timestamps() {
    let config = EngineConfig::default();
    let a = parse_entry("2026-03-16T01:00:00Z,2026-03-16T01:30:00Z", &config).unwrap();
    let b = parse_entry("2026-03-16T10:00:00,2026-03-16T10:30", &config);

    assert_eq!(a.start, kst(2026, 3, 16, 10, 0));
    // The second form has a malformed end ("T10:30" without seconds).
    assert!(b.is_err());
    let c = parse_entry("2026-03-16T10:00:00, 2026-03-16 10:30", &config).unwrap();
    assert_eq!(c, a);
}

#[test]
fn booking_marks_overlapping_and_touching_frames() {
    let config = EngineConfig::default();
    let chart = BookingChart::parse("2026-03-16 10:00:00,2026-03-16 10:30:00", &config);

    assert!(chart.is_reserved(&frame(10, 0)), "exact overlap");
    assert!(chart.is_reserved(&frame(9, 30)), "ends on booking start");
    assert!(chart.is_reserved(&frame(10, 30)), "starts on booking end");
    assert!(!chart.is_reserved(&frame(11, 0)));
    assert!(!chart.conflicts(&frame(9, 30), ConflictRule::Strict));
}

#[test]
fn booked_now_only_reserves_the_current_frame() {
    let config = EngineConfig::default();
    let mut raw = raw_desk(3, "");
    raw.is_booked_now = true;
    let desk = DeskBookingRecord::from_raw(&raw, None, &config).unwrap();
    let now = kst(2026, 3, 16, 10, 10);

    assert!(desk.is_reserved(&frame(10, 0), now, ConflictRule::Touching));
    assert!(!desk.is_reserved(&frame(10, 30), now, ConflictRule::Touching));
}

#[test]
fn fixed_flag_comes_from_the_room() {
    let config = EngineConfig::default();
    let room = room_with_fixed(&[1, 2]);

    let fixed = DeskBookingRecord::from_raw(&raw_desk(2, ""), Some(&room), &config).unwrap();
    let free = DeskBookingRecord::from_raw(&raw_desk(5, ""), Some(&room), &config).unwrap();

    assert!(fixed.is_fixed);
    assert!(!free.is_fixed);
    assert_eq!(free.date, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
}

#[test]
fn bad_record_date_is_an_error() {
    let config = EngineConfig::default();
    let mut raw = raw_desk(1, "");
    raw.date = "16/03/2026".to_string();

    assert!(matches!(
        DeskBookingRecord::from_raw(&raw, None, &config),
        Err(EngineError::InvalidDate(_))
    ));
}
