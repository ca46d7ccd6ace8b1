//! Database error handling utilities
//!
//! ```rust,ignore
//! use pantry_server::features::shared::is_unique_violation;
//!
//! match uow.insert(meal).await {
//!     Err(ServerError::Database(e)) if is_unique_violation(&e) => ...,
//!     ...
//! }
//! ```

use sqlx::Error as SqlxError;

/// Check if the error is a unique constraint violation
pub fn is_unique_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

/// Check if the error is a foreign key violation
pub fn is_foreign_key_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_foreign_key_violation();
    }
    false
}
