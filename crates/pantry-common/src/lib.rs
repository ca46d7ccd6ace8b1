//! Pantry Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Pantry workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`PantryError`] and the crate [`Result`] alias
//! - **Logging**: tracing subscriber initialisation driven by environment
//! - **Serializer**: normalisation of captured column values into JSON for
//!   storage and transport
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use pantry_common::serializer::{FieldValue, Serializer};
//!
//! # fn main() -> pantry_common::Result<()> {
//! let serializer = Serializer::from_offset_hours(5)?;
//! let value = serializer.normalize(&FieldValue::Timestamp(Utc::now()))?;
//! assert!(value.is_string());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logging;
pub mod serializer;

// Re-export commonly used types
pub use error::{PantryError, Result};
