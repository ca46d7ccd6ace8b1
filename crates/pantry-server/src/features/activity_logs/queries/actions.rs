use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::ActivityLogError;
use crate::audit::{self, ActionLogPage};
use crate::features::shared::PaginationParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListActionLogsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl Request<Result<ActionLogPage, ActivityLogError>> for ListActionLogsQuery {}

impl crate::cqrs::middleware::Query for ListActionLogsQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListActionLogsQuery) -> Result<ActionLogPage, ActivityLogError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ActivityLogError::InvalidPagination)?;

    Ok(audit::list_action_logs(&pool, pagination.page(), pagination.limit()).await?)
}
