//! Database queries for the audit tables

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::debug;

use super::models::{
    ActionLogEntry, ActionLogPage, ChangeLogPage, ChangeRecord, LogFilter, LoginInfoEntry,
    LoginInfoPage, NewActionLog, NewChangeRecord, MAX_LOG_PAGE_LIMIT,
};
use crate::error::ServerResult;

const CHANGE_LOG_COLUMNS: &str =
    "id, user_id, table_name, operation, before_data, after_data, created_at, updated_at";
const LOGIN_INFO_COLUMNS: &str = "id, user_id, email, phone, username, login_at";
const ACTION_LOG_COLUMNS: &str = "id, user_id, phone, email, username, role, query, method, path, \
     status_code, process_time, client_host, created_at, updated_at";

/// `(limit, offset)` for a 1-indexed page, with `limit` clamped to `1..=MAX_LOG_PAGE_LIMIT`
fn page_bounds(page: i64, limit: i64) -> (i64, i64) {
    let limit = limit.clamp(1, MAX_LOG_PAGE_LIMIT);
    (limit, (page.max(1) - 1) * limit)
}

/// Append one change record
pub async fn insert_change_record(
    pool: &PgPool,
    record: &NewChangeRecord,
) -> ServerResult<ChangeRecord> {
    let sql = format!(
        r#"
        INSERT INTO change_log (
            table_name, operation, before_data, after_data, user_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING {CHANGE_LOG_COLUMNS}
        "#
    );

    let stored = sqlx::query_as::<_, ChangeRecord>(&sql)
        .bind(record.table_name.as_str())
        .bind(record.operation)
        .bind(record.before_data.clone().map(JsonValue::Object))
        .bind(record.after_data.clone().map(JsonValue::Object))
        .bind(record.actor_id)
        .bind(record.created_at)
        .fetch_one(pool)
        .await?;

    debug!(
        change_id = stored.id,
        table = %stored.table_name,
        operation = %stored.operation,
        "Inserted change record"
    );

    Ok(stored)
}

/// One page of the change log, newest first
///
/// `page` is 1-indexed; `limit` is clamped to `1..=MAX_LOG_PAGE_LIMIT`.
pub async fn list_change_log(pool: &PgPool, page: i64, limit: i64) -> ServerResult<ChangeLogPage> {
    let (limit, offset) = page_bounds(page, limit);

    let sql = format!(
        "SELECT {CHANGE_LOG_COLUMNS} FROM change_log \
         ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
    );
    let items = sqlx::query_as::<_, ChangeRecord>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM change_log")
        .fetch_one(pool)
        .await?;

    Ok(ChangeLogPage { total_count, items })
}

/// One page of authentication events, newest first
pub async fn list_login_info(pool: &PgPool, page: i64, limit: i64) -> ServerResult<LoginInfoPage> {
    let (limit, offset) = page_bounds(page, limit);

    let sql = format!(
        "SELECT {LOGIN_INFO_COLUMNS} FROM login_info \
         ORDER BY login_at DESC, id DESC LIMIT $1 OFFSET $2"
    );
    let items = sqlx::query_as::<_, LoginInfoEntry>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM login_info")
        .fetch_one(pool)
        .await?;

    Ok(LoginInfoPage { total_count, items })
}

/// One page of request actions, newest first
pub async fn list_action_logs(pool: &PgPool, page: i64, limit: i64) -> ServerResult<ActionLogPage> {
    let (limit, offset) = page_bounds(page, limit);

    let sql = format!(
        "SELECT {ACTION_LOG_COLUMNS} FROM action_log \
         ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
    );
    let items = sqlx::query_as::<_, ActionLogEntry>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM action_log")
        .fetch_one(pool)
        .await?;

    Ok(ActionLogPage { total_count, items })
}

/// Change records matching `filter`
pub async fn fetch_change_records(
    pool: &PgPool,
    filter: &LogFilter,
) -> ServerResult<Vec<ChangeRecord>> {
    let sql = format!(
        r#"
        SELECT {CHANGE_LOG_COLUMNS}
        FROM change_log
        WHERE ($1::BIGINT IS NULL OR user_id = $1)
          AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
          AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
        "#
    );

    let records = sqlx::query_as::<_, ChangeRecord>(&sql)
        .bind(filter.user_id)
        .bind(filter.start_time)
        .bind(filter.end_time)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// Authentication events matching `filter`
pub async fn fetch_login_info(
    pool: &PgPool,
    filter: &LogFilter,
) -> ServerResult<Vec<LoginInfoEntry>> {
    let sql = format!(
        r#"
        SELECT {LOGIN_INFO_COLUMNS}
        FROM login_info
        WHERE ($1::BIGINT IS NULL OR user_id = $1)
          AND ($2::TIMESTAMPTZ IS NULL OR login_at >= $2)
          AND ($3::TIMESTAMPTZ IS NULL OR login_at <= $3)
        "#
    );
    let records = sqlx::query_as::<_, LoginInfoEntry>(&sql)
        .bind(filter.user_id)
        .bind(filter.start_time)
        .bind(filter.end_time)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// Per-request action events matching `filter`
pub async fn fetch_action_logs(
    pool: &PgPool,
    filter: &LogFilter,
) -> ServerResult<Vec<ActionLogEntry>> {
    let sql = format!(
        r#"
        SELECT {ACTION_LOG_COLUMNS}
        FROM action_log
        WHERE ($1::BIGINT IS NULL OR user_id = $1)
          AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
          AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
        "#
    );
    let records = sqlx::query_as::<_, ActionLogEntry>(&sql)
        .bind(filter.user_id)
        .bind(filter.start_time)
        .bind(filter.end_time)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// Record one handled request
pub async fn create_action_log(pool: &PgPool, entry: &NewActionLog) -> ServerResult<ActionLogEntry> {
    let record = sqlx::query_as::<_, ActionLogEntry>(
        r#"
        INSERT INTO action_log (
            user_id, phone, email, username, role, query, method, path,
            status_code, process_time, client_host
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, user_id, phone, email, username, role, query, method, path,
                  status_code, process_time, client_host, created_at, updated_at
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.phone)
    .bind(&entry.email)
    .bind(&entry.username)
    .bind(&entry.role)
    .bind(&entry.query)
    .bind(&entry.method)
    .bind(&entry.path)
    .bind(entry.status_code)
    .bind(entry.process_time)
    .bind(&entry.client_host)
    .fetch_one(pool)
    .await?;

    debug!(
        action_id = record.id,
        method = %record.method,
        path = %record.path,
        status = record.status_code,
        "Created action log entry"
    );

    Ok(record)
}
