//! Translate a chosen extension window into the booking-creation request the backend
//! accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::extend::ExtensionOption;
use crate::grid::SlotGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingKind {
    Seat,
    Room,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingDuration {
    Minutes(i64),
    Days(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Desk code for seats, room code for rooms.
    pub target_code: String,
    #[serde(rename = "type")]
    pub kind: BookingKind,
    pub start_instant: DateTime<Utc>,
    pub duration: BookingDuration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl BookingRequest {
    /// Build a request covering `window[0..=last_index]`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidSelection` if the window is empty, `last_index` is out
    /// of range, any selected option is disabled, or a seat booking has no `desk_code`.
    pub fn from_selection(
        grid: &SlotGrid,
        room_code: &str,
        window: &[ExtensionOption],
        last_index: usize,
        desk_code: Option<&str>,
    ) -> Result<Self> {
        let selected = window.get(..=last_index).ok_or_else(|| {
            EngineError::InvalidSelection(format!(
                "option {} is outside a window of {}",
                last_index,
                window.len()
            ))
        })?;
        if let Some(disabled) = selected.iter().find(|o| o.is_disabled) {
            return Err(EngineError::InvalidSelection(format!(
                "slot {} is not bookable",
                disabled.slot
            )));
        }
        let (first, last) = (&selected[0], &selected[last_index]);

        let (kind, target_code) = if grid.features.room_wise {
            (BookingKind::Room, room_code.to_string())
        } else {
            let desk = desk_code.ok_or_else(|| {
                EngineError::InvalidSelection("seat bookings need a desk code".to_string())
            })?;
            (BookingKind::Seat, desk.to_string())
        };

        let duration = if grid.features.day_wise {
            BookingDuration::Days(selected.len() as i64)
        } else {
            BookingDuration::Minutes((last.frame.end - first.frame.start).num_minutes())
        };

        Ok(Self {
            target_code,
            kind,
            start_instant: first.frame.start,
            duration,
            members: Vec::new(),
        })
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }
}
