//! Shared utilities for feature modules
//!
//! - **pagination**: `page` / `limit` query parameters
//! - **query**: query string extractor answering with the error envelope
//! - **error_helpers**: database constraint violation checks
//! - **validation**: name and weight checks
//! - **test_helpers**: fixtures for database tests (test-only)

pub mod error_helpers;
pub mod pagination;
pub mod query;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use error_helpers::{is_foreign_key_violation, is_unique_violation};
pub use pagination::{PaginationParams, DEFAULT_LIMIT, MAX_LIMIT};
pub use query::ValidatedQuery;
pub use validation::{is_positive_weight, validate_name, NameValidationError, MAX_NAME_LENGTH};
