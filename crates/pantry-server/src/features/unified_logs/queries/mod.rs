pub mod list;

pub use list::{
    merge_and_paginate, LogType, UnifiedLogItem, UnifiedLogsError, UnifiedLogsQuery,
    UnifiedLogsResponse,
};
