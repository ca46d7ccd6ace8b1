pub mod list;

pub use list::{ListServingsError, ListServingsQuery, ListServingsResponse};
