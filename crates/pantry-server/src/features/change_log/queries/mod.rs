pub mod list;

pub use list::{ListChangeLogError, ListChangeLogQuery};
