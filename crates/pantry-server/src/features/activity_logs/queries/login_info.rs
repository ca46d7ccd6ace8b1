use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::ActivityLogError;
use crate::audit::{self, LoginInfoPage};
use crate::features::shared::PaginationParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListLoginInfoQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl Request<Result<LoginInfoPage, ActivityLogError>> for ListLoginInfoQuery {}

impl crate::cqrs::middleware::Query for ListLoginInfoQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListLoginInfoQuery) -> Result<LoginInfoPage, ActivityLogError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ActivityLogError::InvalidPagination)?;

    Ok(audit::list_login_info(&pool, pagination.page(), pagination.limit()).await?)
}
