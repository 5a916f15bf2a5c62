//! Tests for contiguous extension windows and booking requests.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Asia::Seoul;
use seat_engine::{
    extension_window, extension_window_with_limit, generate_grid, BookingDuration, BookingKind,
    BookingRequest, DeskBookingRecord, EngineConfig, EngineError, ExtensionLimit,
    ExtensionOption, GridQuery, RawDeskBooking, RoomDescriptor, SlotGrid,
};
use serde_json::json;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn kst(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Seoul
        .with_ymd_and_hms(year, month, day, hour, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn room(extra: serde_json::Value) -> RoomDescriptor {
    let mut value = json!({
        "roomCode": "A",
        "roomName": "Room A",
        "openTime": "09:00:00",
        "closeTime": "18:00:00",
    });
    for (k, v) in extra.as_object().unwrap() {
        value[k] = v.clone();
    }
    serde_json::from_value(value).unwrap()
}

fn desk(room: &RoomDescriptor, chart: &str) -> DeskBookingRecord {
    let raw = RawDeskBooking {
        room_code: room.room_code.clone(),
        desk_code: "A-1".to_string(),
        desk_no: 1,
        date: "2026-03-16".to_string(),
        is_booked_now: false,
        booking_chart: chart.to_string(),
    };
    DeskBookingRecord::from_raw(&raw, Some(room), &EngineConfig::default()).unwrap()
}

fn grid_for(room: RoomDescriptor, desks: &[DeskBookingRecord], query: GridQuery) -> SlotGrid {
    generate_grid(&[room], desks, &query, &EngineConfig::default())
        .into_grid()
        .unwrap()
}

fn morning() -> GridQuery {
    GridQuery::at(kst(2026, 3, 16, 8, 0))
}

fn enabled_labels(window: &[ExtensionOption]) -> Vec<String> {
    window
        .iter()
        .filter(|o| !o.is_disabled)
        .map(|o| o.slot.label())
        .collect()
}

// ── Time-wise ───────────────────────────────────────────────────────────────

#[test]
fn ninety_minute_cap_from_two_pm() {
    // 14:00, 14:30, 15:00 end at 14:30, 15:00, 15:30 (≤ 90 min from 14:00).
    // 15:30 would end at 16:00, 120 min after the start, so it and everything
    // after it is disabled.
    let grid = grid_for(room(json!({"maxUsageMinutes": 90})), &[], morning());
    let window = extension_window(&grid, "A", "14:00:00").unwrap();

    assert_eq!(enabled_labels(&window), vec!["14:00:00", "14:30:00", "15:00:00"]);
    assert_eq!(window[3].slot.label(), "15:30:00");
    assert!(window[3].is_disabled);
    assert!(window[3..].iter().all(|o| o.is_disabled));
    assert_eq!(window.last().unwrap().slot.label(), "17:30:00");
    assert_eq!(window.len(), 8);
}

#[test]
fn reservation_disables_the_rest_of_the_window() {
    // Booking 15:30-16:00 reserves 15:00 (touching), 15:30 and 16:00 (touching).
    let a = room(json!({"maxUsageMinutes": 240}));
    let desks = vec![desk(&a, "2026-03-16 15:30:00,2026-03-16 16:00:00")];
    let grid = grid_for(a, &desks, morning());
    let window = extension_window(&grid, "A", "14:00:00").unwrap();

    assert_eq!(enabled_labels(&window), vec!["14:00:00", "14:30:00"]);
    // 16:30 is available again but stays disabled: windows must be contiguous.
    let after = window.iter().find(|o| o.slot.label() == "16:30:00").unwrap();
    assert!(after.is_disabled);
}

#[test]
fn unavailable_start_disables_everything() {
    let a = room(json!({"maxUsageMinutes": 120}));
    let desks = vec![desk(&a, "2026-03-16 14:00:00,2026-03-16 14:30:00")];
    let grid = grid_for(a, &desks, morning());
    let window = extension_window(&grid, "A", "14:00:00").unwrap();

    assert!(window.iter().all(|o| o.is_disabled));
}

#[test]
fn missing_cap_is_unbounded() {
    let grid = grid_for(room(json!({})), &[], morning());
    let window = extension_window(&grid, "A", "16:00:00").unwrap();

    assert_eq!(enabled_labels(&window), vec!["16:00:00", "16:30:00", "17:00:00", "17:30:00"]);
}

#[test]
fn explicit_limit_overrides_the_room() {
    let grid = grid_for(room(json!({"maxUsageMinutes": 240})), &[], morning());
    let window =
        extension_window_with_limit(&grid, "A", "09:00:00", ExtensionLimit::Minutes(60)).unwrap();

    assert_eq!(enabled_labels(&window), vec!["09:00:00", "09:30:00"]);
}

#[test]
fn unknown_room_or_slot_is_an_error() {
    let grid = grid_for(room(json!({})), &[], morning());

    assert!(matches!(
        extension_window(&grid, "Z", "09:00:00"),
        Err(EngineError::UnknownRoom(_))
    ));
    assert!(matches!(
        extension_window(&grid, "A", "08:00:00"),
        Err(EngineError::UnknownSlot(_))
    ));
}

// ── Day-wise ────────────────────────────────────────────────────────────────

#[test]
fn day_wise_window_counts_days() {
    let locker = room(json!({"isDayWiseBooking": true, "maxFutureDays": 3}));
    let grid = grid_for(locker, &[], morning().days(5));
    let window = extension_window(&grid, "A", "2026-03-16").unwrap();

    assert_eq!(
        enabled_labels(&window),
        vec!["2026-03-16", "2026-03-17", "2026-03-18"]
    );
    assert_eq!(window.len(), 5);
}

#[test]
fn day_wise_window_from_a_later_day_hits_the_horizon() {
    let locker = room(json!({"isDayWiseBooking": true, "maxFutureDays": 3}));
    let grid = grid_for(locker, &[], morning().days(5));
    let window = extension_window(&grid, "A", "2026-03-17").unwrap();

    // Day three from today (03-19) is already closed.
    assert_eq!(enabled_labels(&window), vec!["2026-03-17", "2026-03-18"]);
}

// ── Booking requests ────────────────────────────────────────────────────────

#[test]
fn seat_request_spans_the_selected_frames() {
    let grid = grid_for(room(json!({"maxUsageMinutes": 90})), &[], morning());
    let window = extension_window(&grid, "A", "14:00:00").unwrap();

    let request = BookingRequest::from_selection(&grid, "A", &window, 2, Some("A-7")).unwrap();

    assert_eq!(request.kind, BookingKind::Seat);
    assert_eq!(request.target_code, "A-7");
    assert_eq!(request.start_instant, kst(2026, 3, 16, 14, 0));
    assert_eq!(request.duration, BookingDuration::Minutes(90));
}

#[test]
fn room_request_targets_the_room() {
    let meeting = room(json!({"isRoomWiseBooking": true}));
    let grid = grid_for(meeting, &[], morning());
    let window = extension_window(&grid, "A", "10:00:00").unwrap();

    let request = BookingRequest::from_selection(&grid, "A", &window, 1, None)
        .unwrap()
        .with_members(vec!["u1".to_string(), "u2".to_string()]);

    assert_eq!(request.kind, BookingKind::Room);
    assert_eq!(request.target_code, "A");
    assert_eq!(request.duration, BookingDuration::Minutes(60));

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["type"], "ROOM");
    assert_eq!(json["targetCode"], "A");
    assert_eq!(json["members"][1], "u2");
}

#[test]
fn day_request_counts_days() {
    let locker = room(json!({"isDayWiseBooking": true, "isRoomWiseBooking": true, "maxFutureDays": 3}));
    let grid = grid_for(locker, &[], morning().days(3));
    let window = extension_window(&grid, "A", "2026-03-16").unwrap();

    let request = BookingRequest::from_selection(&grid, "A", &window, 1, None).unwrap();
    assert_eq!(request.duration, BookingDuration::Days(2));
    assert_eq!(request.start_instant, kst(2026, 3, 16, 9, 0));
}

#[test]
fn disabled_or_incomplete_selections_are_rejected() {
    let grid = grid_for(room(json!({"maxUsageMinutes": 90})), &[], morning());
    let window = extension_window(&grid, "A", "14:00:00").unwrap();

    assert!(matches!(
        BookingRequest::from_selection(&grid, "A", &window, 3, Some("A-1")),
        Err(EngineError::InvalidSelection(_))
    ));
    assert!(matches!(
        BookingRequest::from_selection(&grid, "A", &window, 99, Some("A-1")),
        Err(EngineError::InvalidSelection(_))
    ));
    assert!(matches!(
        BookingRequest::from_selection(&grid, "A", &window, 0, None),
        Err(EngineError::InvalidSelection(_))
    ));
}
