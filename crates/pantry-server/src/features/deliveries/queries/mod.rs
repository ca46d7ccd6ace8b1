pub mod get;
pub mod list;

pub use get::{GetDeliveryError, GetDeliveryQuery};
pub use list::{ListDeliveriesError, ListDeliveriesQuery, ListDeliveriesResponse};
