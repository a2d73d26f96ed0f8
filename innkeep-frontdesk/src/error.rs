use chrono::NaiveDate;
use innkeep_core::{ReservationStatus, RoomStatus};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum FrontDeskError {
    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Invalid reservation status: {actual} (expected {expected})")]
    InvalidStatus {
        actual: ReservationStatus,
        expected: String,
    },

    #[error("Check-in date is {check_in}, today is {today}")]
    InvalidCheckInDate { check_in: NaiveDate, today: NaiveDate },

    #[error("Room not found: {0}")]
    RoomNotFound(Uuid),

    #[error("Room {0} does not belong to the reservation's hotel and room type")]
    RoomTypeMismatch(Uuid),

    #[error("Room {room_id} is not available ({status})")]
    RoomNotAvailable { room_id: Uuid, status: RoomStatus },

    #[error("Room {0} is occupied")]
    RoomOccupied(Uuid),

    #[error("Folio not found for reservation {0}")]
    FolioNotFound(Uuid),

    #[error("Outstanding balance of {balance} must be settled before check-out")]
    UnpaidBalance { balance: i64 },

    #[error("Failed to release hold for {day}: {reason}")]
    HoldReleaseError { day: NaiveDate, reason: String },

    #[error("Failed to add reserved unit for {day}: {reason}")]
    ReservedIncrementError { day: NaiveDate, reason: String },

    #[error("Failed to return inventory for {day}: {reason}")]
    InventoryReleaseError { day: NaiveDate, reason: String },

    #[error("Failed to update reservation: {0}")]
    UpdateReservationError(String),

    #[error("Failed to update room: {0}")]
    UpdateRoomError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Store(String),
}

impl FrontDeskError {
    /// Stable name of the failure, used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            FrontDeskError::ReservationNotFound(_) => "ReservationNotFound",
            FrontDeskError::InvalidStatus { .. } => "InvalidStatus",
            FrontDeskError::InvalidCheckInDate { .. } => "InvalidCheckInDate",
            FrontDeskError::RoomNotFound(_) => "RoomNotFound",
            FrontDeskError::RoomTypeMismatch(_) => "RoomTypeMismatch",
            FrontDeskError::RoomNotAvailable { .. } => "RoomNotAvailable",
            FrontDeskError::RoomOccupied(_) => "RoomOccupied",
            FrontDeskError::FolioNotFound(_) => "FolioNotFound",
            FrontDeskError::UnpaidBalance { .. } => "UnpaidBalance",
            FrontDeskError::HoldReleaseError { .. } => "HoldReleaseError",
            FrontDeskError::ReservedIncrementError { .. } => "ReservedIncrementError",
            FrontDeskError::InventoryReleaseError { .. } => "InventoryReleaseError",
            FrontDeskError::UpdateReservationError(_) => "UpdateReservationError",
            FrontDeskError::UpdateRoomError(_) => "UpdateRoomError",
            FrontDeskError::InvalidRequest(_) => "InvalidRequest",
            FrontDeskError::Store(_) => "Store",
        }
    }
}

impl From<innkeep_core::StoreError> for FrontDeskError {
    fn from(err: innkeep_core::StoreError) -> Self {
        FrontDeskError::Store(err.to_string())
    }
}

pub type FrontDeskResult<T> = Result<T, FrontDeskError>;
