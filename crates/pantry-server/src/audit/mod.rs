//! Change auditing and request logging
//!
//! Two audit trails are produced here:
//!
//! - **Change log**: every insert, update and delete of a tracked entity is
//!   captured by the [`ChangeInterceptor`] as a before/after column diff tagged
//!   with the acting user, handed to the [`ChangeQueue`] without blocking the
//!   write, and persisted in FIFO order by a single [`ChangeConsumer`].
//! - **Action log**: the [`AuditLayer`] records one row per authenticated
//!   request and binds the caller as the acting user for the request's scope.
//!
//! # Usage
//!
//! ```no_run
//! use pantry_common::serializer::Serializer;
//! use pantry_server::audit::{ChangeConsumer, ChangeInterceptor, ChangeQueue};
//! use sqlx::PgPool;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(pool: PgPool) {
//! let (queue, receiver) = ChangeQueue::unbounded();
//! let consumer = ChangeConsumer::start(receiver, pool.clone(), CancellationToken::new());
//! let interceptor = ChangeInterceptor::new(Serializer::default(), queue);
//! // ... register `interceptor` with the entity store, serve requests ...
//! let stats = consumer.shutdown().await;
//! # }
//! ```

pub mod actor;
mod interceptor;
mod middleware;
mod models;
mod queries;
mod queue;

#[cfg(test)]
mod middleware_tests;

pub use actor::{get_actor, set_actor, ActorId};
pub use interceptor::{
    ChangeInterceptor, ColumnHistory, Instance, MutationObserver, Row, Tracked, TrackedEntity,
    UPDATED_AT_COLUMN,
};
pub use middleware::{AuditLayer, UNKNOWN_CLIENT_HOST};
pub use models::{
    ActionLogEntry, ActionLogPage, ChangeLogPage, ChangeRecord, ColumnImage, LogFilter, LogPage,
    LoginInfoEntry, LoginInfoPage, NewActionLog, NewChangeRecord, Operation, TrackedTable,
    DEFAULT_LOG_PAGE_LIMIT, MAX_LOG_PAGE_LIMIT,
};
pub use queries::{
    create_action_log, fetch_action_logs, fetch_change_records, fetch_login_info,
    insert_change_record, list_action_logs, list_change_log, list_login_info,
};
pub use queue::{
    ChangeConsumer, ChangeLogWriter, ChangeQueue, ChangeReceiver, ConsumerHandle, ConsumerStats,
    QueueStats,
};
