use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{self, ChangeLogPage};
use crate::error::ServerError;
use crate::features::shared::PaginationParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListChangeLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListChangeLogError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Store error: {0}")]
    Store(#[from] ServerError),
}

impl Request<Result<ChangeLogPage, ListChangeLogError>> for ListChangeLogQuery {}

impl crate::cqrs::middleware::Query for ListChangeLogQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListChangeLogQuery) -> Result<ChangeLogPage, ListChangeLogError> {
    let pagination = PaginationParams::new(query.page, query.limit);
    pagination
        .validate()
        .map_err(ListChangeLogError::InvalidPagination)?;

    let page = audit::list_change_log(&pool, pagination.page(), pagination.limit()).await?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{insert_change_record, NewChangeRecord, Operation, TrackedTable};
    use chrono::{Duration, Utc};

    fn record(minutes_ago: i64) -> NewChangeRecord {
        NewChangeRecord {
            table_name: TrackedTable::Meal,
            operation: Operation::Create,
            before_data: None,
            after_data: None,
            actor_id: Some(1),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_newest_first(pool: PgPool) {
        for minutes_ago in [30, 10, 20] {
            insert_change_record(&pool, &record(minutes_ago)).await.unwrap();
        }

        let query = ListChangeLogQuery {
            page: Some(1),
            limit: Some(2),
        };
        let page = handle(pool, query).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].created_at > page.items[1].created_at);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_rejects_oversized_limit(pool: PgPool) {
        let query = ListChangeLogQuery {
            page: None,
            limit: Some(500),
        };
        let result = handle(pool, query).await;
        assert!(matches!(result, Err(ListChangeLogError::InvalidPagination(_))));
    }
}
