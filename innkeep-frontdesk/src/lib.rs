pub mod desk;
pub mod error;

pub use desk::{CheckInOutcome, CheckOutOutcome, ConfirmPaymentOutcome, FrontDesk};
pub use error::{FrontDeskError, FrontDeskResult};
