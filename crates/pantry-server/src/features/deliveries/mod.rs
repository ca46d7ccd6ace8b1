//! Ingredient deliveries

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateDeliveryCommand, CreateDeliveryError, CreateDeliveryResponse, DeleteDeliveryCommand,
    DeleteDeliveryError, DeleteDeliveryResponse,
};
pub use queries::{
    GetDeliveryError, GetDeliveryQuery, ListDeliveriesError, ListDeliveriesQuery,
    ListDeliveriesResponse,
};
pub use routes::deliveries_routes;
