//! WASM bindings for seat-engine.
//!
//! Exposes slot grid generation, extension windows and booking-request assembly to
//! JavaScript via `wasm-bindgen`. Every call takes the provider snapshot and the query
//! as JSON strings and returns JSON, so the front end stays the only owner of state.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p seat-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/seat-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/seat_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use seat_engine::dst::resolve_local;
use seat_engine::{
    extension_window, generate_grid, BookingRequest, EngineConfig, ExtensionOption, GridOutcome,
    GridQuery, SlotGrid, Snapshot,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Query input
// ---------------------------------------------------------------------------

/// Query format passed from JavaScript.
///
/// `now` is required: the engine never reads the clock itself.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryInput {
    now: String,
    date: Option<String>,
    #[serde(default)]
    room_codes: Vec<String>,
    days: Option<u32>,
    desk_code: Option<String>,
    timezone: Option<String>,
    slot_minutes: Option<i64>,
}

impl QueryInput {
    fn config(&self) -> Result<EngineConfig, String> {
        let mut config = EngineConfig::default();
        if let Some(tz) = &self.timezone {
            config = config.with_timezone(tz).map_err(|e| e.to_string())?;
        }
        if let Some(minutes) = self.slot_minutes {
            config = config.with_slot_minutes(minutes).map_err(|e| e.to_string())?;
        }
        Ok(config)
    }

    fn query(&self, config: &EngineConfig) -> Result<GridQuery, String> {
        let mut query = GridQuery::at(parse_datetime(&self.now, config)?).rooms(&self.room_codes);
        if let Some(date) = &self.date {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| format!("Invalid date '{}': {}", date, e))?;
            query = query.on_date(date);
        }
        if let Some(days) = self.days {
            query = query.days(days);
        }
        if let Some(desk) = &self.desk_code {
            query = query.desk(desk.as_str());
        }
        Ok(query)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (e.g., "2026-03-16T10:10:00+09:00") and naive local time
/// (e.g., "2026-03-16T10:10:00"), which is read in the configured timezone.
fn parse_datetime(s: &str, config: &EngineConfig) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let local = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))?;
    resolve_local(&config.timezone, local, config.dst_policy)
        .ok_or_else(|| format!("Datetime '{}' does not exist in {}", s, config.timezone))
}

fn outcome(snapshot_json: &str, query_json: &str) -> Result<GridOutcome, String> {
    let snapshot = Snapshot::from_json(snapshot_json).map_err(|e| e.to_string())?;
    let input: QueryInput =
        serde_json::from_str(query_json).map_err(|e| format!("Invalid query JSON: {}", e))?;
    let config = input.config()?;
    let query = input.query(&config)?;
    let desks = snapshot.desk_records(&config);
    Ok(generate_grid(&snapshot.rooms, &desks, &query, &config))
}

fn grid(snapshot_json: &str, query_json: &str) -> Result<SlotGrid, String> {
    match outcome(snapshot_json, query_json)? {
        GridOutcome::Grid(grid) => Ok(grid),
        GridOutcome::NoData(reason) => Err(format!("No grid data: {:?}", reason)),
    }
}

fn window(
    grid: &SlotGrid,
    room_code: &str,
    start_label: &str,
) -> Result<Vec<ExtensionOption>, String> {
    extension_window(grid, room_code, start_label).map_err(|e| e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn grid_json(snapshot_json: &str, query_json: &str) -> Result<String, String> {
    to_json(&outcome(snapshot_json, query_json)?)
}

fn extension_json(
    snapshot_json: &str,
    query_json: &str,
    room_code: &str,
    start_label: &str,
) -> Result<String, String> {
    let grid = grid(snapshot_json, query_json)?;
    to_json(&window(&grid, room_code, start_label)?)
}

fn booking_json(
    snapshot_json: &str,
    query_json: &str,
    room_code: &str,
    start_label: &str,
    last_index: usize,
    desk_code: Option<&str>,
) -> Result<String, String> {
    let grid = grid(snapshot_json, query_json)?;
    let options = window(&grid, room_code, start_label)?;
    let request = BookingRequest::from_selection(&grid, room_code, &options, last_index, desk_code)
        .map_err(|e| e.to_string())?;
    to_json(&request)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Build the slot grid for a snapshot.
///
/// Returns either `{"grid": {...}}` or `{"no_data": "<reason>"}` as a JSON string.
///
/// # Arguments
/// - `snapshot_json` -- `{"rooms": [...], "desks": [...]}` as delivered by the backend
/// - `query_json` -- `{"now", "date"?, "roomCodes"?, "days"?, "deskCode"?, "timezone"?, "slotMinutes"?}`
#[wasm_bindgen(js_name = "generateGrid")]
pub fn generate_grid_js(snapshot_json: &str, query_json: &str) -> Result<String, JsValue> {
    grid_json(snapshot_json, query_json).map_err(|e| JsValue::from_str(&e))
}

/// List the extension options for a room starting at `start_label`
/// (`"HH:MM:SS"` for time-wise grids, `"YYYY-MM-DD"` for day-wise grids).
#[wasm_bindgen(js_name = "extensionWindow")]
pub fn extension_window_js(
    snapshot_json: &str,
    query_json: &str,
    room_code: &str,
    start_label: &str,
) -> Result<String, JsValue> {
    extension_json(snapshot_json, query_json, room_code, start_label)
        .map_err(|e| JsValue::from_str(&e))
}

/// Turn a selection (start slot through option `last_index`) into a booking-creation
/// request. `desk_code` is required unless the room is booked as a whole.
#[wasm_bindgen(js_name = "bookingRequest")]
pub fn booking_request_js(
    snapshot_json: &str,
    query_json: &str,
    room_code: &str,
    start_label: &str,
    last_index: u32,
    desk_code: Option<String>,
) -> Result<String, JsValue> {
    booking_json(
        snapshot_json,
        query_json,
        room_code,
        start_label,
        last_index as usize,
        desk_code.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}
