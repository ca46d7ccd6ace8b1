//! One paginated view over the three audit trails

pub mod queries;
pub mod routes;

pub use queries::{
    merge_and_paginate, LogType, UnifiedLogItem, UnifiedLogsError, UnifiedLogsQuery,
    UnifiedLogsResponse,
};
pub use routes::unified_logs_routes;
