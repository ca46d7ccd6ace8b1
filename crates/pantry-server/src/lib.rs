//! Pantry Server Library
//!
//! HTTP backend for a kitchen's stock and menu, with a complete audit trail.
//!
//! # Overview
//!
//! - **Stock and menu**: ingredients, meals and their recipes, deliveries
//!   that restock ingredients and servings that draw them down
//! - **Change log**: every write to a tracked entity is captured as a
//!   before/after column diff tagged with the acting user
//! - **Action log**: one row per authenticated request
//! - **Unified logs**: login events, request actions and entity changes in a
//!   single paginated view
//!
//! # Architecture
//!
//! Features are vertical slices of commands, queries and routes wired through
//! the `mediator` crate. Commands write through [`store::EntityStore`], whose
//! units of work call the [`audit::ChangeInterceptor`] at every insert, update
//! and delete. The interceptor hands records to an in-process queue that a
//! single background consumer persists in FIFO order, so a write never waits
//! on its audit record.
//!
//! # Example
//!
//! ```no_run
//! use pantry_server::{api, audit, config::Config, db, store::EntityStore};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&(&config.database).into()).await?;
//!
//!     let (queue, receiver) = audit::ChangeQueue::unbounded();
//!     let consumer = audit::ChangeConsumer::start(receiver, pool.clone(), CancellationToken::new());
//!     let interceptor = audit::ChangeInterceptor::new(config.audit.serializer()?, queue);
//!     let store = EntityStore::new(pool.clone()).with_observer(interceptor);
//!
//!     let app = api::create_router(api::AppState { db: pool, store }, &config);
//!     // ... serve `app` ...
//!     consumer.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, ServerError, ServerResult};
