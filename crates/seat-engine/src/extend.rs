//! Contiguous extension windows: which slots a booking starting at a given slot may
//! run through.
//!
//! The window lists every slot from the start to the end of the grid. Options stay
//! enabled while they are `Available`, contiguous and within the room's cap; the first
//! option that fails any of those and everything after it are disabled, but still
//! returned so callers can render them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::grid::{SlotGrid, SlotKey};
use crate::interval::Interval;

/// How far a booking may extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtensionLimit {
    /// Time-wise: the selection's total span, start of the first frame to end of the
    /// last, may not exceed this.
    Minutes(u32),
    /// Day-wise: at most this many days.
    Days(u32),
    Unbounded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionOption {
    pub slot: SlotKey,
    pub frame: Interval,
    pub is_disabled: bool,
}

/// The limit configured for `room_code` in `grid`.
///
/// # Errors
/// Returns `EngineError::UnknownRoom` if the grid has no such column.
pub fn limit_for(grid: &SlotGrid, room_code: &str) -> Result<ExtensionLimit> {
    let column = grid
        .column(room_code)
        .ok_or_else(|| EngineError::UnknownRoom(room_code.to_string()))?;
    let header = &grid.headers[column];
    let limit = if grid.features.day_wise {
        header.max_future_days.map(ExtensionLimit::Days)
    } else {
        header.max_usage_minutes.map(ExtensionLimit::Minutes)
    };
    Ok(limit.unwrap_or(ExtensionLimit::Unbounded))
}

/// Extension window for `room_code` starting at the slot labelled `start`, capped by
/// the room's own limit.
pub fn extension_window(grid: &SlotGrid, room_code: &str, start: &str) -> Result<Vec<ExtensionOption>> {
    let limit = limit_for(grid, room_code)?;
    extension_window_with_limit(grid, room_code, start, limit)
}

/// Extension window with an explicit cap.
///
/// # Errors
/// Returns `EngineError::UnknownRoom` or `EngineError::UnknownSlot` if the room or
/// start label is not in the grid.
pub fn extension_window_with_limit(
    grid: &SlotGrid,
    room_code: &str,
    start: &str,
    limit: ExtensionLimit,
) -> Result<Vec<ExtensionOption>> {
    let column = grid
        .column(room_code)
        .ok_or_else(|| EngineError::UnknownRoom(room_code.to_string()))?;
    let first = grid
        .row_index(start)
        .ok_or_else(|| EngineError::UnknownSlot(start.to_string()))?;

    let origin = grid.rows[first].cells[column].frame.start;
    let mut previous_end: Option<DateTime<Utc>> = None;
    let mut blocked = false;

    let options = grid.rows[first..]
        .iter()
        .enumerate()
        .map(|(count, row)| {
            let cell = &row.cells[column];
            let within_cap = match limit {
                ExtensionLimit::Minutes(max) => {
                    (cell.frame.end - origin).num_minutes() <= i64::from(max)
                }
                ExtensionLimit::Days(max) => count < max as usize,
                ExtensionLimit::Unbounded => true,
            };
            // Day frames follow each room's hours, so only time-wise rows must abut.
            let contiguous = grid.features.day_wise
                || previous_end.is_none_or(|end| end == cell.frame.start);

            blocked = blocked || !within_cap || !contiguous || !cell.is_available();
            previous_end = Some(cell.frame.end);

            ExtensionOption {
                slot: row.slot,
                frame: cell.frame,
                is_disabled: blocked,
            }
        })
        .collect();
    Ok(options)
}
