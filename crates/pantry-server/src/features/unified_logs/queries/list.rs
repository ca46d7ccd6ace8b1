//! Unified log view across the three audit trails
//!
//! Every applicable source is fetched in full and concurrently, tagged with its
//! [`LogType`], then merged and paginated in memory. Pagination happens after
//! the global sort, so `total_count` is the size of the combined result.
//!
//! Ordering is by each record's own timestamp, newest first. Records with the
//! same timestamp are ordered by source priority (`login_info`, `logging`,
//! `change_log`) and then by id, newest first.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::future::join_all;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{self, ActionLogEntry, ChangeRecord, LogFilter, LoginInfoEntry};
use crate::error::ServerResult;
use crate::features::shared::PaginationParams;

/// Source of a unified log item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    LoginInfo,
    Logging,
    ChangeLog,
}

impl LogType {
    /// All sources in priority order
    pub const ALL: [LogType; 3] = [LogType::LoginInfo, LogType::Logging, LogType::ChangeLog];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginInfo => "login_info",
            Self::Logging => "logging",
            Self::ChangeLog => "change_log",
        }
    }

    fn priority(&self) -> u8 {
        match self {
            Self::LoginInfo => 0,
            Self::Logging => 1,
            Self::ChangeLog => 2,
        }
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown log type: {}", s))
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record from any source, tagged with `log_type` when serialized
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "log_type", rename_all = "snake_case")]
pub enum UnifiedLogItem {
    LoginInfo(LoginInfoEntry),
    Logging(ActionLogEntry),
    ChangeLog(ChangeRecord),
}

impl UnifiedLogItem {
    pub fn log_type(&self) -> LogType {
        match self {
            Self::LoginInfo(_) => LogType::LoginInfo,
            Self::Logging(_) => LogType::Logging,
            Self::ChangeLog(_) => LogType::ChangeLog,
        }
    }

    /// `login_at` for authentication events, `created_at` otherwise
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::LoginInfo(entry) => entry.login_at,
            Self::Logging(entry) => entry.created_at,
            Self::ChangeLog(record) => record.created_at,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::LoginInfo(entry) => entry.id,
            Self::Logging(entry) => entry.id,
            Self::ChangeLog(record) => record.id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifiedLogsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// One of `login_info`, `logging`, `change_log`; all sources when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_type: Option<String>,
    /// Inclusive lower bound, RFC 3339 or a bare date/time taken as UTC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Inclusive upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedLogsResponse {
    pub total_count: i64,
    pub items: Vec<UnifiedLogItem>,
    /// Set when at least one source failed and was treated as empty
    pub partial: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sources: Vec<LogType>,
}

#[derive(Debug, thiserror::Error)]
pub enum UnifiedLogsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Invalid log_type '{0}': expected login_info, logging or change_log")]
    InvalidLogType(String),
    #[error("Invalid {field} '{value}': expected an ISO 8601 date or date-time")]
    InvalidDate { field: &'static str, value: String },
}

impl Request<Result<UnifiedLogsResponse, UnifiedLogsError>> for UnifiedLogsQuery {}

impl crate::cqrs::middleware::Query for UnifiedLogsQuery {}

/// Request parameters after validation
#[derive(Debug, Clone, PartialEq)]
struct UnifiedLogsPlan {
    pagination: PaginationParams,
    sources: Vec<LogType>,
    filter: LogFilter,
}

impl UnifiedLogsQuery {
    fn plan(&self) -> Result<UnifiedLogsPlan, UnifiedLogsError> {
        let pagination = PaginationParams::new(self.page, self.limit);
        pagination
            .validate()
            .map_err(UnifiedLogsError::InvalidPagination)?;

        let sources = match self.log_type.as_deref().map(str::trim) {
            None | Some("") => LogType::ALL.to_vec(),
            Some(raw) => {
                let log_type = raw
                    .parse::<LogType>()
                    .map_err(|_| UnifiedLogsError::InvalidLogType(raw.to_string()))?;
                vec![log_type]
            },
        };

        let filter = LogFilter {
            user_id: self.user_id,
            start_time: parse_bound("start_date", self.start_date.as_deref())?,
            end_time: parse_bound("end_date", self.end_date.as_deref())?,
        };

        Ok(UnifiedLogsPlan {
            pagination,
            sources,
            filter,
        })
    }
}

fn parse_bound(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, UnifiedLogsError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    parse_timestamp(raw)
        .map(Some)
        .ok_or_else(|| UnifiedLogsError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

/// Accepts RFC 3339, or a date-time / date without offset taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

async fn fetch_source(
    pool: &PgPool,
    source: LogType,
    filter: &LogFilter,
) -> ServerResult<Vec<UnifiedLogItem>> {
    let items = match source {
        LogType::LoginInfo => audit::fetch_login_info(pool, filter)
            .await?
            .into_iter()
            .map(UnifiedLogItem::LoginInfo)
            .collect(),
        LogType::Logging => audit::fetch_action_logs(pool, filter)
            .await?
            .into_iter()
            .map(UnifiedLogItem::Logging)
            .collect(),
        LogType::ChangeLog => audit::fetch_change_records(pool, filter)
            .await?
            .into_iter()
            .map(UnifiedLogItem::ChangeLog)
            .collect(),
    };
    Ok(items)
}

fn newest_first(a: &UnifiedLogItem, b: &UnifiedLogItem) -> Ordering {
    b.timestamp()
        .cmp(&a.timestamp())
        .then_with(|| a.log_type().priority().cmp(&b.log_type().priority()))
        .then_with(|| b.id().cmp(&a.id()))
}

/// Sort the combined records and cut out one page
///
/// Returns the total number of records alongside the page.
pub fn merge_and_paginate(
    mut items: Vec<UnifiedLogItem>,
    pagination: &PaginationParams,
) -> (i64, Vec<UnifiedLogItem>) {
    items.sort_by(newest_first);
    let total_count = items.len() as i64;

    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit()).unwrap_or(0);
    let page = items.into_iter().skip(offset).take(limit).collect();

    (total_count, page)
}

/// Query, merge and paginate the applicable log sources
///
/// A failing source is logged and treated as empty; the response is then
/// marked `partial` and names the failed sources.
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: UnifiedLogsQuery,
) -> Result<UnifiedLogsResponse, UnifiedLogsError> {
    let plan = query.plan()?;

    let fetches = plan
        .sources
        .iter()
        .map(|&source| {
            let pool = &pool;
            let filter = &plan.filter;
            async move { (source, fetch_source(pool, source, filter).await) }
        });
    let results = join_all(fetches).await;

    let mut combined = Vec::new();
    let mut failed_sources = Vec::new();
    for (source, result) in results {
        match result {
            Ok(items) => {
                tracing::debug!(source = %source, count = items.len(), "Fetched log source");
                combined.extend(items);
            },
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "Log source failed, treating as empty");
                failed_sources.push(source);
            },
        }
    }

    let (total_count, items) = merge_and_paginate(combined, &plan.pagination);

    Ok(UnifiedLogsResponse {
        total_count,
        items,
        partial: !failed_sources.is_empty(),
        failed_sources,
    })
}
