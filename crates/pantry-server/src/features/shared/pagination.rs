//! Shared pagination utilities
//!
//! ```rust,ignore
//! use pantry_server::features::shared::PaginationParams;
//!
//! let params = PaginationParams::new(Some(2), Some(20));
//! params.validate()?;
//! let offset = params.offset(); // 20
//! ```

use serde::{Deserialize, Serialize};

/// Items per page when `limit` is not given
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted `limit`
pub const MAX_LIMIT: i64 = 100;

/// `page` / `limit` request parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 10, at most 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Rows to skip before the requested page
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Reject out-of-range values instead of clamping them
    pub fn validate(&self) -> Result<(), &'static str> {
        if matches!(self.page, Some(page) if page < 1) {
            return Err("Page must be greater than 0");
        }
        if matches!(self.limit, Some(limit) if !(1..=MAX_LIMIT).contains(&limit)) {
            return Err("Limit must be between 1 and 100");
        }
        Ok(())
    }
}
