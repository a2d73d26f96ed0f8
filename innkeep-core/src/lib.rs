pub mod access;
pub mod clock;
pub mod events;
pub mod folio;
pub mod inventory;
pub mod repository;
pub mod reservation;
pub mod room;

pub use access::{AccessPolicy, Permission};
pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{EventPublisher, RecordingPublisher};
pub use folio::{Folio, FolioLineItem, LineItemKind};
pub use inventory::{InventoryAdjustment, InventoryDay, InventoryViolation};
pub use repository::{
    FolioRepository, FrontDeskStore, InventoryRepository, ReservationRepository,
    ReservationTransition, RoomRepository, RoomTransition, StoreError, StoreResult,
};
pub use reservation::{Reservation, ReservationMetadata, ReservationStatus};
pub use room::{Room, RoomLock, RoomStatus};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown reservation status: {0}")]
    UnknownReservationStatus(String),
    #[error("Unknown room status: {0}")]
    UnknownRoomStatus(String),
    #[error("Unknown line item kind: {0}")]
    UnknownLineItemKind(String),
    #[error("Unknown permission `{permission}` for role `{role}`")]
    UnknownPermission { role: String, permission: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
