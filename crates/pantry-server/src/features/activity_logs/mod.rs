//! Read access to login events and per-request actions

pub mod queries;
pub mod routes;

pub use queries::{ActivityLogError, ListActionLogsQuery, ListLoginInfoQuery};
pub use routes::{action_log_routes, login_info_routes};
