pub mod create;
pub mod delete;

pub use create::{CreateDeliveryCommand, CreateDeliveryError, CreateDeliveryResponse};
pub use delete::{DeleteDeliveryCommand, DeleteDeliveryError, DeleteDeliveryResponse};
