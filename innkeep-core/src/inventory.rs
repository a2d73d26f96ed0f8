use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Day-level counters for one room type of one hotel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryDay {
    pub hotel_id: Uuid,
    pub room_type_id: Uuid,
    pub day: NaiveDate,
    pub total: i32,
    pub reserved: i32,
    pub holds: i32,
}

impl InventoryDay {
    pub fn new(hotel_id: Uuid, room_type_id: Uuid, day: NaiveDate, total: i32) -> Self {
        Self {
            hotel_id,
            room_type_id,
            day,
            total,
            reserved: 0,
            holds: 0,
        }
    }

    /// Rooms still sellable for this night.
    pub fn available(&self) -> i32 {
        self.total - self.reserved - self.holds
    }
}

/// Counter deltas applied to one night of a reservation's room type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryAdjustment {
    pub day: NaiveDate,
    pub holds_delta: i32,
    pub reserved_delta: i32,
}

impl InventoryAdjustment {
    /// Hold becomes a reserved unit (payment confirmed).
    pub fn convert_hold(day: NaiveDate) -> Self {
        Self { day, holds_delta: -1, reserved_delta: 1 }
    }

    /// Hold given back (cancelled or expired before payment).
    pub fn release_hold(day: NaiveDate) -> Self {
        Self { day, holds_delta: -1, reserved_delta: 0 }
    }

    /// Reserved unit given back (confirmed booking cancelled).
    pub fn release_reserved(day: NaiveDate) -> Self {
        Self { day, holds_delta: 0, reserved_delta: -1 }
    }
}

/// Why a night's counters refused an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryViolation {
    MissingDay,
    HoldUnderflow,
    ReservedUnderflow,
    OverCapacity,
}

impl fmt::Display for InventoryViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            InventoryViolation::MissingDay => "no inventory row for this night",
            InventoryViolation::HoldUnderflow => "no hold left to release",
            InventoryViolation::ReservedUnderflow => "no reserved unit left to release",
            InventoryViolation::OverCapacity => "reserved units would exceed total",
        };
        f.write_str(msg)
    }
}
