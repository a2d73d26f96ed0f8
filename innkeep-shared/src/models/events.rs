use uuid::Uuid;

/// Lifecycle notifications pushed to Kafka and to the dashboard's SSE stream.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrontDeskEvent {
    ReservationConfirmed {
        reservation_id: Uuid,
        hotel_id: Uuid,
        payment_method: Option<String>,
        total_amount: i64,
        timestamp: i64,
    },
    GuestCheckedIn {
        reservation_id: Uuid,
        hotel_id: Uuid,
        room_id: Uuid,
        room_number: String,
        timestamp: i64,
    },
    GuestCheckedOut {
        reservation_id: Uuid,
        hotel_id: Uuid,
        room_id: Option<Uuid>,
        final_balance: i64,
        timestamp: i64,
    },
    ReservationCancelled {
        reservation_id: Uuid,
        hotel_id: Uuid,
        timestamp: i64,
    },
    ReservationExpired {
        reservation_id: Uuid,
        hotel_id: Uuid,
        timestamp: i64,
    },
    RoomStatusChanged {
        room_id: Uuid,
        hotel_id: Uuid,
        status: String,
        timestamp: i64,
    },
}

impl FrontDeskEvent {
    pub fn hotel_id(&self) -> Uuid {
        match self {
            FrontDeskEvent::ReservationConfirmed { hotel_id, .. }
            | FrontDeskEvent::GuestCheckedIn { hotel_id, .. }
            | FrontDeskEvent::GuestCheckedOut { hotel_id, .. }
            | FrontDeskEvent::ReservationCancelled { hotel_id, .. }
            | FrontDeskEvent::ReservationExpired { hotel_id, .. }
            | FrontDeskEvent::RoomStatusChanged { hotel_id, .. } => *hotel_id,
        }
    }

    /// SSE event name, e.g. `guest_checked_in`.
    pub fn kind(&self) -> &'static str {
        match self {
            FrontDeskEvent::ReservationConfirmed { .. } => "reservation_confirmed",
            FrontDeskEvent::GuestCheckedIn { .. } => "guest_checked_in",
            FrontDeskEvent::GuestCheckedOut { .. } => "guest_checked_out",
            FrontDeskEvent::ReservationCancelled { .. } => "reservation_cancelled",
            FrontDeskEvent::ReservationExpired { .. } => "reservation_expired",
            FrontDeskEvent::RoomStatusChanged { .. } => "room_status_changed",
        }
    }
}
