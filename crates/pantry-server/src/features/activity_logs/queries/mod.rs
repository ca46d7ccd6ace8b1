pub mod actions;
pub mod login_info;

pub use actions::ListActionLogsQuery;
pub use login_info::ListLoginInfoQuery;

use crate::error::ServerError;

/// Failure of either activity listing
#[derive(Debug, thiserror::Error)]
pub enum ActivityLogError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}
