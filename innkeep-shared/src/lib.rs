pub mod models;
pub mod pii;

pub use models::events::FrontDeskEvent;
pub use pii::Masked;
