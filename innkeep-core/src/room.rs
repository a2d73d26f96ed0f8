use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Occupancy / housekeeping state of a physical room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
    /// Vacated, waiting for housekeeping.
    Maintenance,
    OutOfOrder,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Maintenance => "MAINTENANCE",
            RoomStatus::OutOfOrder => "OUT_OF_ORDER",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(RoomStatus::Available),
            "OCCUPIED" => Ok(RoomStatus::Occupied),
            "MAINTENANCE" => Ok(RoomStatus::Maintenance),
            "OUT_OF_ORDER" => Ok(RoomStatus::OutOfOrder),
            other => Err(CoreError::UnknownRoomStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type_id: Uuid,
    pub number: String,
    pub status: RoomStatus,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(hotel_id: Uuid, room_type_id: Uuid, number: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            hotel_id,
            room_type_id,
            number: number.to_string(),
            status: RoomStatus::Available,
            updated_at: Utc::now(),
        }
    }

    /// Same hotel and same room type as the booking.
    pub fn matches(&self, hotel_id: Uuid, room_type_id: Uuid) -> bool {
        self.hotel_id == hotel_id && self.room_type_id == room_type_id
    }
}

/// Binds a physical room to a reservation for one night. Unique per (room, day).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomLock {
    pub room_id: Uuid,
    pub day: NaiveDate,
    pub reservation_id: Uuid,
}
