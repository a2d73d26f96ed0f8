pub mod folio;
pub mod inventory;
pub mod nights;

pub use folio::{post_line_item, room_charge, LedgerError};
pub use inventory::{apply_adjustment, InventoryLedger};
pub use nights::stay_nights;
