//! # seat-engine
//!
//! Deterministic availability grids for seat and room reservations.
//!
//! Given rooms with their operating hours, the desks' booking charts and a booking
//! mode (day-wise or time-wise, room-wise or per desk), the engine computes a grid of
//! time slots × rooms where every cell is `Available`, `Reserve` or `Closed`, and the
//! contiguous windows a booking may extend through. It performs no I/O: callers hand
//! in a snapshot of backend data and get a fresh grid back.
//!
//! ## Modules
//!
//! - [`interval`]: half-open intervals and the booking conflict rules
//! - [`hours`]: room open/close strings → operating window (midnight rollover, 24h)
//! - [`chart`]: `"start,end|start,end"` booking charts → intervals
//! - [`model`]: room descriptors and desk booking records
//! - [`grid`]: the slot grid generator
//! - [`extend`]: contiguous extension windows
//! - [`booking`]: selection → booking-creation request
//! - [`snapshot`]: one provider poll as JSON
//! - [`config`]: timezone, slot length, DST policy
//! - [`dst`]: resolving local wall-clock times
//! - [`error`]: Error types

pub mod booking;
pub mod chart;
pub mod config;
pub mod dst;
pub mod error;
pub mod extend;
pub mod grid;
pub mod hours;
pub mod interval;
pub mod model;
pub mod snapshot;

pub use booking::{BookingDuration, BookingKind, BookingRequest};
pub use chart::BookingChart;
pub use config::EngineConfig;
pub use error::EngineError;
pub use extend::{extension_window, extension_window_with_limit, ExtensionLimit, ExtensionOption};
pub use grid::{
    generate_grid, GridOutcome, GridQuery, NoDataReason, SlotCell, SlotGrid, SlotKey, SlotStatus,
};
pub use interval::Interval;
pub use model::{DeskBookingRecord, RawDeskBooking, RoomDescriptor};
pub use snapshot::Snapshot;
