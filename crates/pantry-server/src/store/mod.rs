//! Persistence layer for tracked entities
//!
//! All writes to tracked tables go through a [`UnitOfWork`], which wraps one
//! database transaction and calls the registered [`MutationObserver`]s at
//! each instrumentation point:
//!
//! ```text
//! insert  -> INSERT ... RETURNING            -> after_insert
//! update  -> before_flush -> UPDATE ... RETURNING -> after_update
//! delete  -> DELETE                          -> after_delete
//! ```
//!
//! Observers fire as soon as the statement has executed, not at commit.
//! Rows loaded through [`UnitOfWork::find`] are locked for the rest of the
//! transaction. Handlers take every lock and run every check before their
//! first write, so a refused request emits no change records.

mod entities;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use crate::audit::{Instance, MutationObserver, Tracked, TrackedEntity};
use crate::error::ServerResult;

/// SQL for one tracked entity
#[async_trait]
pub trait Persist: TrackedEntity {
    /// Primary key
    type Key: Copy + Send + Sync + std::fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Load the row and lock it (`FOR UPDATE`) until the transaction ends
    async fn fetch(conn: &mut PgConnection, key: Self::Key) -> sqlx::Result<Option<Self>>;

    /// Insert `self`, ignoring database-assigned columns, and return the stored row
    async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self>;

    /// Write every mutable column and return the stored row
    async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self>;

    /// Returns `false` when the row was already gone
    async fn delete(&self, conn: &mut PgConnection) -> sqlx::Result<bool>;
}

/// Entry point to the persistence layer
#[derive(Clone)]
pub struct EntityStore {
    pool: PgPool,
    observers: Arc<[Arc<dyn MutationObserver>]>,
}

impl EntityStore {
    /// Create a store with no observers
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            observers: Arc::new([]),
        }
    }

    /// Register an observer called on every write of every unit of work
    pub fn with_observer(self, observer: impl MutationObserver + 'static) -> Self {
        let observer: Arc<dyn MutationObserver> = Arc::new(observer);
        let observers = self.observers.iter().cloned().chain(std::iter::once(observer)).collect();
        Self {
            pool: self.pool,
            observers,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start a unit of work in a new transaction
    pub async fn begin(&self) -> ServerResult<UnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork {
            tx,
            observers: Arc::clone(&self.observers),
        })
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// One transaction's worth of tracked writes
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls the
/// transaction back.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
    observers: Arc<[Arc<dyn MutationObserver>]>,
}

impl UnitOfWork {
    /// Connection for reads and untracked statements inside the transaction
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    /// Load an entity for modification
    ///
    /// The row stays locked until the unit of work commits or rolls back, so
    /// concurrent units of work touching the same row run one after another
    /// and each diff is taken against the committed value.
    pub async fn find<T: Persist>(&mut self, key: T::Key) -> ServerResult<Option<Tracked<T>>> {
        let entity = T::fetch(&mut *self.tx, key).await?;
        Ok(entity.map(Tracked::new))
    }

    pub async fn insert<T: Persist>(&mut self, entity: T) -> ServerResult<Tracked<T>> {
        let stored = entity.insert(&mut *self.tx).await?;
        debug!(table = %T::TABLE, key = ?stored.key(), "Inserted row");

        let tracked = Tracked::new(stored);
        for observer in self.observers.iter() {
            observer.after_insert(&tracked);
        }
        Ok(tracked)
    }

    /// Flush pending changes of `tracked`
    ///
    /// Returns `false` without touching the database when nothing changed.
    pub async fn update<T: Persist>(&mut self, tracked: &mut Tracked<T>) -> ServerResult<bool> {
        if !tracked.is_dirty() {
            return Ok(false);
        }

        for observer in self.observers.iter() {
            let mut dirty: [&mut dyn Instance; 1] = [&mut *tracked];
            observer.before_flush(&mut dirty);
        }

        let stored = tracked.get().update(&mut *self.tx).await?;
        debug!(table = %T::TABLE, key = ?stored.key(), "Updated row");

        tracked.replace(stored);
        for observer in self.observers.iter() {
            observer.after_update(&mut *tracked);
        }
        tracked.mark_clean();
        Ok(true)
    }

    /// Delete the row behind `tracked`
    ///
    /// Observers see the entity as it was loaded, including unflushed edits.
    /// Returns `false` when the row no longer existed.
    pub async fn delete<T: Persist>(&mut self, tracked: Tracked<T>) -> ServerResult<bool> {
        let removed = tracked.get().delete(&mut *self.tx).await?;
        if removed {
            debug!(table = %T::TABLE, key = ?tracked.get().key(), "Deleted row");
            for observer in self.observers.iter() {
                observer.after_delete(&tracked);
            }
        }
        Ok(removed)
    }

    pub async fn commit(self) -> ServerResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
