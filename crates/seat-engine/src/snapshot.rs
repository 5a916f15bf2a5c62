//! One poll worth of provider data: the rooms and the raw desk bookings.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{DeskBookingRecord, RawDeskBooking, RoomDescriptor};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rooms: Vec<RoomDescriptor>,
    #[serde(default)]
    pub desks: Vec<RawDeskBooking>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse every desk record, annotating fixed desks from their rooms.
    /// Records with a bad date are dropped with a warning.
    pub fn desk_records(&self, config: &EngineConfig) -> Vec<DeskBookingRecord> {
        self.desks
            .iter()
            .filter_map(|raw| {
                let room = self.rooms.iter().find(|r| r.room_code == raw.room_code);
                match DeskBookingRecord::from_raw(raw, room, config) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(desk = %raw.desk_code, %err, "skipping desk record");
                        None
                    }
                }
            })
            .collect()
    }
}
