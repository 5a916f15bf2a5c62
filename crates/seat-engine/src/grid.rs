//! Slot grid generation: time slots × rooms, each cell resolved to
//! `Available`, `Reserve` or `Closed`.
//!
//! The generator is a pure function of its inputs. Given the same rooms, desk
//! records, query (including `now`) and config it returns a structurally equal
//! grid, so callers can recompute on every poll tick and diff the results.
//!
//! Cell status precedence, first match wins:
//! 1. `Closed` when a day-wise slot lies outside the booking horizon;
//! 2. `Closed` when the room is shut that day or the frame is outside its hours;
//! 3. `Reserve` when a booking conflicts with the frame;
//! 4. `Available`.
//!
//! Time-wise grids start at the next slot boundary after `now`. That first slot stands
//! in for "now": a desk flagged `is_booked_now` reserves it. Without an explicit date,
//! a session that opened the previous evening and is still running is listed too.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dst::{resolve_local, DstPolicy};
use crate::hours;
use crate::interval::{ConflictRule, Interval};
use crate::model::{CategoryFeatures, ClosureReason, DeskBookingRecord, RoomDescriptor};

/// Availability of one (slot, room) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotStatus {
    Available,
    Reserve,
    Closed,
}

/// Why a cell is `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    NotOperating,
    WeekOff,
    Holiday,
    DayOff,
    /// The frame is not inside the room's operating window.
    OutsideHours,
    /// The room's open/close times are missing or unparseable.
    MissingHours,
    /// The day lies at or past `maxFutureDays` from today.
    BeyondHorizon,
    Past,
}

impl From<ClosureReason> for ClosedReason {
    fn from(reason: ClosureReason) -> Self {
        match reason {
            ClosureReason::NotOperating => Self::NotOperating,
            ClosureReason::WeekOff => Self::WeekOff,
            ClosureReason::Holiday => Self::Holiday,
            ClosureReason::DayOff => Self::DayOff,
        }
    }
}

/// A grid row key: a calendar day (day-wise) or a local start time (time-wise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKey {
    Day(NaiveDate),
    Time(NaiveDateTime),
}

impl SlotKey {
    /// `YYYY-MM-DD` for days, `HH:MM:SS` for times.
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            SlotKey::Day(date) => *date,
            SlotKey::Time(local) => local.date(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            SlotKey::Time(local) => write!(f, "{}", local.format("%H:%M:%S")),
        }
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCell {
    pub status: SlotStatus,
    pub closed_reason: Option<ClosedReason>,
    pub frame: Interval,
    pub room_code: String,
    pub room_name: String,
}

impl SlotCell {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

/// A grid column: the room plus the limits the extender needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridHeader {
    pub room_code: String,
    pub room_name: String,
    pub max_usage_minutes: Option<u32>,
    pub max_future_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub slot: SlotKey,
    /// One cell per header, in header order.
    pub cells: Vec<SlotCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotGrid {
    pub features: CategoryFeatures,
    pub reference_date: NaiveDate,
    pub headers: Vec<GridHeader>,
    pub rows: Vec<GridRow>,
}

impl SlotGrid {
    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.slot.label()).collect()
    }

    /// Index of the first row whose label is `label`.
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.slot.label() == label)
    }

    pub fn row(&self, label: &str) -> Option<&GridRow> {
        self.row_index(label).map(|i| &self.rows[i])
    }

    pub fn column(&self, room_code: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.room_code == room_code)
    }

    pub fn cell(&self, label: &str, room_code: &str) -> Option<&SlotCell> {
        let column = self.column(room_code)?;
        self.row(label).map(|row| &row.cells[column])
    }
}

/// Why no grid could be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    NoRooms,
    NoMatchingRooms,
    /// No selected room has usable open/close times.
    NoOperatingHours,
}

/// Result of [`generate_grid`]. `NoData` is distinct from a grid in which every
/// cell happens to be closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridOutcome {
    NoData(NoDataReason),
    Grid(SlotGrid),
}

impl GridOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, GridOutcome::NoData(_))
    }

    pub fn grid(&self) -> Option<&SlotGrid> {
        match self {
            GridOutcome::Grid(grid) => Some(grid),
            GridOutcome::NoData(_) => None,
        }
    }

    pub fn into_grid(self) -> Option<SlotGrid> {
        match self {
            GridOutcome::Grid(grid) => Some(grid),
            GridOutcome::NoData(_) => None,
        }
    }
}

/// What to build a grid for.
#[derive(Debug, Clone, PartialEq)]
pub struct GridQuery {
    pub now: DateTime<Utc>,
    /// Reference date; defaults to today in the configured timezone.
    pub date: Option<NaiveDate>,
    /// Rooms to include. Empty selects all.
    pub room_codes: Vec<String>,
    /// Day-wise only: number of days from the reference date.
    pub days: Option<u32>,
    /// Desk-level grids only: evaluate this desk instead of the whole room.
    pub desk_code: Option<String>,
}

impl GridQuery {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            date: None,
            room_codes: Vec::new(),
            days: None,
            desk_code: None,
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn rooms<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.room_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn desk(mut self, desk_code: impl Into<String>) -> Self {
        self.desk_code = Some(desk_code.into());
        self
    }
}

/// One selected room with the desk records that decide its cells.
struct RoomColumn<'a> {
    room: &'a RoomDescriptor,
    desks: Vec<&'a DeskBookingRecord>,
}

impl RoomColumn<'_> {
    fn cell(&self, frame: Interval, status: SlotStatus, reason: Option<ClosedReason>) -> SlotCell {
        SlotCell {
            status,
            closed_reason: reason,
            frame,
            room_code: self.room.room_code.clone(),
            room_name: self.room.room_name.clone(),
        }
    }

    /// Room-wise rooms and a selected desk are reserved by any conflicting record.
    /// Otherwise the room is reserved only when every bookable desk is.
    ///
    /// `current` is the slot standing in for "now" in a time-wise grid; a desk flagged
    /// `is_booked_now` reserves it even though the frame starts after `now`.
    fn is_reserved(
        &self,
        frame: &Interval,
        current: Option<&Interval>,
        ctx: &GridContext<'_>,
        rule: ConflictRule,
    ) -> bool {
        let now = ctx.query.now;
        let reserves = |d: &DeskBookingRecord| {
            d.is_reserved(frame, now, rule) || (d.is_booked_now && current == Some(frame))
        };
        if ctx.features.room_wise {
            return self.desks.iter().any(|d| reserves(*d));
        }
        if ctx.query.desk_code.is_some() {
            return self.desks.iter().any(|d| d.is_fixed || reserves(*d));
        }
        if self.desks.is_empty() {
            return false;
        }
        self.desks.iter().filter(|d| !d.is_fixed).all(|desk| {
            self.desks
                .iter()
                .filter(|d| d.desk_code == desk.desk_code)
                .any(|d| reserves(*d))
        })
    }
}

struct GridContext<'a> {
    query: &'a GridQuery,
    config: &'a EngineConfig,
    features: CategoryFeatures,
    today: NaiveDate,
    reference_date: NaiveDate,
}

/// Build the availability grid for `rooms`.
///
/// All rooms are assumed to share one catalog's booking features; the first selected
/// room's flags are used for the whole grid and disagreement is logged.
pub fn generate_grid(
    rooms: &[RoomDescriptor],
    desks: &[DeskBookingRecord],
    query: &GridQuery,
    config: &EngineConfig,
) -> GridOutcome {
    if rooms.is_empty() {
        return GridOutcome::NoData(NoDataReason::NoRooms);
    }

    let selected: Vec<&RoomDescriptor> = rooms
        .iter()
        .filter(|r| query.room_codes.is_empty() || query.room_codes.contains(&r.room_code))
        .collect();
    if selected.is_empty() {
        return GridOutcome::NoData(NoDataReason::NoMatchingRooms);
    }

    let features = canonical_features(&selected);
    let today = query.now.with_timezone(&config.timezone).date_naive();
    let ctx = GridContext {
        query,
        config,
        features,
        today,
        reference_date: query.date.unwrap_or(today),
    };

    let columns: Vec<RoomColumn<'_>> = selected
        .iter()
        .map(|&room| RoomColumn {
            room,
            desks: desks
                .iter()
                .filter(|d| d.room_code == room.room_code)
                .filter(|d| {
                    features.room_wise
                        || query.desk_code.as_ref().is_none_or(|code| *code == d.desk_code)
                })
                .collect(),
        })
        .collect();

    let rows = if features.day_wise {
        day_rows(&columns, &ctx)
    } else {
        time_rows(&columns, &ctx)
    };
    let Some(rows) = rows else {
        return GridOutcome::NoData(NoDataReason::NoOperatingHours);
    };

    debug!(
        rooms = columns.len(),
        slots = rows.len(),
        day_wise = features.day_wise,
        "generated slot grid"
    );

    GridOutcome::Grid(SlotGrid {
        features,
        reference_date: ctx.reference_date,
        headers: selected
            .iter()
            .map(|r| GridHeader {
                room_code: r.room_code.clone(),
                room_name: r.room_name.clone(),
                max_usage_minutes: r.max_usage_minutes,
                max_future_days: r.max_future_days,
            })
            .collect(),
        rows,
    })
}

fn canonical_features(rooms: &[&RoomDescriptor]) -> CategoryFeatures {
    let first = rooms[0].features();
    if let Some(odd) = rooms.iter().find(|r| r.features() != first) {
        warn!(
            canonical = %rooms[0].room_code,
            room = %odd.room_code,
            "rooms disagree on booking features; using the first room's"
        );
    }
    first
}

/// The next slot boundary strictly after the current local minute.
///
/// With 30-minute slots: 10:00–10:29 round to 10:30, 10:30–10:59 to 11:00.
pub fn round_up_to_slot(now: DateTime<Utc>, config: &EngineConfig) -> DateTime<Utc> {
    let local = now.with_timezone(&config.timezone).naive_local();
    let minute = i64::from(local.minute());
    let next = (minute / config.slot_minutes + 1) * config.slot_minutes;
    let hour_start = local.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(local.hour()));
    // A boundary inside a DST gap moves to the end of the gap, whatever the policy,
    // so later slots stay aligned.
    resolve_local(
        &config.timezone,
        hour_start + Duration::minutes(next),
        DstPolicy::ShiftForward,
    )
    .unwrap_or(now)
}

fn window_or_warn(room: &RoomDescriptor, date: NaiveDate, config: &EngineConfig) -> Option<Interval> {
    match room.operating_window(date, config) {
        Ok(window) => Some(window),
        Err(err) => {
            warn!(room = %room.room_code, %date, %err, "room has no usable operating hours");
            None
        }
    }
}

/// A room's operating windows for a time-wise grid: the reference date's, preceded by
/// the previous day's when that session runs past midnight and is still open at `now`.
/// Empty when the room has no usable hours.
fn time_windows(room: &RoomDescriptor, ctx: &GridContext<'_>) -> Vec<Interval> {
    let mut windows = Vec::with_capacity(2);
    if ctx.query.date.is_none() {
        let yesterday = ctx.reference_date - Duration::days(1);
        if let Ok(carried) = room.operating_window(yesterday, ctx.config) {
            if carried.contains(ctx.query.now) {
                windows.push(carried);
            }
        }
    }
    windows.extend(window_or_warn(room, ctx.reference_date, ctx.config));
    windows
}

fn time_rows(columns: &[RoomColumn<'_>], ctx: &GridContext<'_>) -> Option<Vec<GridRow>> {
    let config = ctx.config;
    let windows: Vec<Vec<Interval>> = columns.iter().map(|c| time_windows(c.room, ctx)).collect();

    let min_open = windows.iter().flatten().map(|w| w.start).min()?;
    let max_close = windows.iter().flatten().map(|w| w.end).max()?;

    let now = ctx.query.now;
    let mut cursor = if now > min_open {
        round_up_to_slot(now, config)
    } else {
        min_open
    };
    // While some room is open, the first slot is the one an immediate booking takes.
    let current = (min_open <= now && now < max_close && cursor < max_close)
        .then(|| Interval::starting_at(cursor, config.slot_minutes));
    debug!(%min_open, %max_close, start = %cursor, "time-wise grid bounds");

    let mut rows = Vec::new();
    while cursor < max_close {
        let frame = Interval::starting_at(cursor, config.slot_minutes);
        let slot = SlotKey::Time(cursor.with_timezone(&config.timezone).naive_local());
        let cells = columns
            .iter()
            .zip(&windows)
            .map(|(column, windows)| time_cell(column, windows, frame, current.as_ref(), ctx))
            .collect();
        rows.push(GridRow { slot, cells });
        cursor = frame.end;
    }
    Some(rows)
}

fn time_cell(
    column: &RoomColumn<'_>,
    windows: &[Interval],
    frame: Interval,
    current: Option<&Interval>,
    ctx: &GridContext<'_>,
) -> SlotCell {
    if let Some(reason) = column.room.closure_reason() {
        return column.cell(frame, SlotStatus::Closed, Some(reason.into()));
    }
    if windows.is_empty() {
        return column.cell(frame, SlotStatus::Closed, Some(ClosedReason::MissingHours));
    }
    if !windows.iter().any(|w| w.covers(&frame)) {
        return column.cell(frame, SlotStatus::Closed, Some(ClosedReason::OutsideHours));
    }
    if column.is_reserved(&frame, current, ctx, ConflictRule::Touching) {
        column.cell(frame, SlotStatus::Reserve, None)
    } else {
        column.cell(frame, SlotStatus::Available, None)
    }
}

fn day_rows(columns: &[RoomColumn<'_>], ctx: &GridContext<'_>) -> Option<Vec<GridRow>> {
    if !columns
        .iter()
        .any(|c| c.room.operating_window(ctx.reference_date, ctx.config).is_ok())
    {
        for column in columns {
            window_or_warn(column.room, ctx.reference_date, ctx.config);
        }
        return None;
    }

    let (first, last) = day_range(columns, ctx);
    debug!(%first, %last, "day-wise grid bounds");

    let rows = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| GridRow {
            slot: SlotKey::Day(date),
            cells: columns.iter().map(|c| day_cell(c, date, ctx)).collect(),
        })
        .collect();
    Some(rows)
}

/// An explicit day count wins; otherwise the desk records' date range; otherwise
/// the reference date alone.
fn day_range(columns: &[RoomColumn<'_>], ctx: &GridContext<'_>) -> (NaiveDate, NaiveDate) {
    if let Some(days) = ctx.query.days {
        let span = i64::from(days.max(1)) - 1;
        return (ctx.reference_date, ctx.reference_date + Duration::days(span));
    }
    let dates = || columns.iter().flat_map(|c| c.desks.iter().map(|d| d.date));
    match (dates().min(), dates().max()) {
        (Some(min), Some(max)) => (min, max),
        _ => (ctx.reference_date, ctx.reference_date),
    }
}

fn day_cell(column: &RoomColumn<'_>, date: NaiveDate, ctx: &GridContext<'_>) -> SlotCell {
    let room = column.room;
    let window = room.operating_window(date, ctx.config).ok();
    let frame = window
        .or_else(|| hours::day_window(date, ctx.config).ok())
        .unwrap_or_else(|| Interval::starting_at(date.and_time(NaiveTime::MIN).and_utc(), 24 * 60));
    let closed = |reason: ClosedReason| column.cell(frame, SlotStatus::Closed, Some(reason));

    let offset = (date - ctx.today).num_days();
    if offset < 0 {
        return closed(ClosedReason::Past);
    }
    if room.max_future_days.is_some_and(|max| offset >= i64::from(max)) {
        return closed(ClosedReason::BeyondHorizon);
    }

    if date == ctx.reference_date {
        if let Some(reason) = room.closure_reason() {
            return closed(reason.into());
        }
    }
    let Some(window) = window else {
        return closed(ClosedReason::MissingHours);
    };
    if ctx.query.now >= window.end {
        return closed(ClosedReason::Past);
    }

    // Adjacent days of a 24h room share a boundary, so days use strict overlap.
    if column.is_reserved(&frame, None, ctx, ConflictRule::Strict) {
        column.cell(frame, SlotStatus::Reserve, None)
    } else {
        column.cell(frame, SlotStatus::Available, None)
    }
}
