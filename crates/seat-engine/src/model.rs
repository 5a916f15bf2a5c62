//! Rooms and desk bookings as delivered by the backend, plus their parsed forms.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::BookingChart;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::hours;
use crate::interval::{ConflictRule, Interval};

/// One bookable room (or desk group) as of a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDescriptor {
    pub room_code: String,
    pub room_name: String,
    /// Local `HH:MM:SS`. Missing hours close every cell of the room.
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default = "default_true")]
    pub is_operating_today: bool,
    #[serde(default)]
    pub is_week_off: bool,
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub is_day_off: bool,
    /// Longest single booking in time-wise mode. `None` means uncapped.
    #[serde(default)]
    pub max_usage_minutes: Option<u32>,
    /// Booking horizon in days from today. `None` means uncapped.
    #[serde(default)]
    pub max_future_days: Option<u32>,
    #[serde(default)]
    pub is_day_wise_booking: bool,
    #[serde(default)]
    pub is_room_wise_booking: bool,
    #[serde(default)]
    pub is_multi_user_booking: bool,
    #[serde(default)]
    pub fixed_desk_numbers: BTreeSet<u32>,
}

fn default_true() -> bool {
    true
}

/// Why a room is shut for its whole reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureReason {
    NotOperating,
    WeekOff,
    Holiday,
    DayOff,
}

/// Booking-mode flags shared by every room of one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryFeatures {
    /// Slots are whole days rather than fixed-length frames.
    pub day_wise: bool,
    /// Bookings target the room, not an individual desk.
    pub room_wise: bool,
}

impl RoomDescriptor {
    pub fn features(&self) -> CategoryFeatures {
        CategoryFeatures {
            day_wise: self.is_day_wise_booking,
            room_wise: self.is_room_wise_booking,
        }
    }

    /// The most specific reason the room is closed on its reference date, if any.
    pub fn closure_reason(&self) -> Option<ClosureReason> {
        if self.is_holiday {
            Some(ClosureReason::Holiday)
        } else if self.is_week_off {
            Some(ClosureReason::WeekOff)
        } else if self.is_day_off {
            Some(ClosureReason::DayOff)
        } else if !self.is_operating_today {
            Some(ClosureReason::NotOperating)
        } else {
            None
        }
    }

    /// Operating window on `date`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidTimeOfDay` if either time is missing or unparseable.
    pub fn operating_window(&self, date: NaiveDate, config: &EngineConfig) -> Result<Interval> {
        let (open, close) = match (&self.open_time, &self.close_time) {
            (Some(open), Some(close)) => (open, close),
            _ => {
                return Err(EngineError::InvalidTimeOfDay(format!(
                    "room {} has no open/close time",
                    self.room_code
                )))
            }
        };
        hours::operating_window(open, close, date, config)
    }

    pub fn is_fixed_desk(&self, desk_no: u32) -> bool {
        self.fixed_desk_numbers.contains(&desk_no)
    }
}

/// A desk's booking state exactly as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeskBooking {
    pub room_code: String,
    pub desk_code: String,
    #[serde(default)]
    pub desk_no: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub is_booked_now: bool,
    /// `"start,end|start,end"`
    #[serde(default)]
    pub booking_chart: String,
}

/// One desk's booking state for one room on one date, chart already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskBookingRecord {
    pub room_code: String,
    pub desk_code: String,
    pub desk_no: u32,
    pub date: NaiveDate,
    /// Permanently reserved; never bookable through the normal flow.
    pub is_fixed: bool,
    pub is_booked_now: bool,
    pub booking_chart: BookingChart,
}

impl DeskBookingRecord {
    /// Parse a wire record. `is_fixed` is annotated from the owning room when known.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDate` if the record's date is unparseable. Bad chart
    /// entries are skipped, not reported.
    pub fn from_raw(
        raw: &RawDeskBooking,
        room: Option<&RoomDescriptor>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d")
            .map_err(|_| EngineError::InvalidDate(raw.date.clone()))?;
        Ok(Self {
            room_code: raw.room_code.clone(),
            desk_code: raw.desk_code.clone(),
            desk_no: raw.desk_no,
            date,
            is_fixed: room.is_some_and(|r| r.is_fixed_desk(raw.desk_no)),
            is_booked_now: raw.is_booked_now,
            booking_chart: BookingChart::parse(&raw.booking_chart, config),
        })
    }

    /// Whether `frame` is unavailable on this desk.
    ///
    /// The `is_booked_now` flag only counts for the frame containing `now`: an
    /// immediate booking may not have reached the chart yet.
    pub fn is_reserved(&self, frame: &Interval, now: DateTime<Utc>, rule: ConflictRule) -> bool {
        self.booking_chart.conflicts(frame, rule) || (self.is_booked_now && frame.contains(now))
    }
}
