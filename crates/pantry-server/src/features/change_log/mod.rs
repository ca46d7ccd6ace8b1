//! Read access to the entity change log

pub mod queries;
pub mod routes;

pub use queries::{ListChangeLogError, ListChangeLogQuery};
pub use routes::change_log_routes;
