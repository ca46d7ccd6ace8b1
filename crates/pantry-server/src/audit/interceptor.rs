//! Mutation interception for tracked entities
//!
//! The persistence layer wraps every tracked entity in a [`Tracked`] handle that
//! remembers the row image last written to the database. The unit of work calls
//! the registered [`MutationObserver`]s at four points:
//!
//! 1. `before_flush` for every dirty instance about to be written
//! 2. `after_insert` once an INSERT has executed
//! 3. `after_update` once an UPDATE has executed
//! 4. `after_delete` once a DELETE has executed
//!
//! [`ChangeInterceptor`] is the observer that turns those callbacks into
//! change records and hands them to the [`ChangeQueue`].

use std::collections::BTreeMap;

use chrono::Utc;
use pantry_common::serializer::{FieldValue, Serializer};
use tracing::{debug, warn};

use super::actor::get_actor;
use super::models::{ColumnImage, NewChangeRecord, Operation, TrackedTable};
use super::queue::ChangeQueue;

/// Column maintained by the database on every write; never part of a diff
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Column name to value, ordered by column name
pub type Row = BTreeMap<&'static str, FieldValue>;

/// A persisted entity whose mutations are audited
pub trait TrackedEntity: Clone + Send + Sync + 'static {
    const TABLE: TrackedTable;

    /// Snapshot of every mapped column
    fn to_row(&self) -> Row;
}

/// Prior and current value of one changed column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHistory {
    pub column: &'static str,
    pub prior: FieldValue,
    pub current: FieldValue,
}

/// Dirty-tracking handle around a tracked entity
///
/// `committed` is the row image as of the last flush. Mutations through
/// [`Tracked::get_mut`] are compared against it by [`Tracked::history`].
#[derive(Debug, Clone)]
pub struct Tracked<T: TrackedEntity> {
    current: T,
    committed: Row,
    before_image: Option<Row>,
}

impl<T: TrackedEntity> Tracked<T> {
    /// Wrap an entity freshly loaded from (or written to) the database
    pub fn new(entity: T) -> Self {
        let committed = entity.to_row();
        Self {
            current: entity,
            committed,
            before_image: None,
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn into_inner(self) -> T {
        self.current
    }

    /// Replace the in-memory entity, keeping the committed image
    pub(crate) fn replace(&mut self, entity: T) {
        self.current = entity;
    }

    /// Columns whose current value differs from the committed image
    pub fn history(&self) -> Vec<ColumnHistory> {
        let current = self.current.to_row();
        current
            .into_iter()
            .filter_map(|(column, value)| {
                let prior = self.committed.get(column).cloned().unwrap_or(FieldValue::Null);
                (prior != value).then_some(ColumnHistory {
                    column,
                    prior,
                    current: value,
                })
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.history().is_empty()
    }

    /// Treat the current state as flushed
    pub fn mark_clean(&mut self) {
        self.committed = self.current.to_row();
        self.before_image = None;
    }
}

/// Object-safe view of a tracked instance handed to observers
pub trait Instance: Send {
    fn table(&self) -> TrackedTable;
    fn current_row(&self) -> Row;
    fn history(&self) -> Vec<ColumnHistory>;
    fn stash_before_image(&mut self, image: Row);
    fn take_before_image(&mut self) -> Option<Row>;
}

impl<T: TrackedEntity> Instance for Tracked<T> {
    fn table(&self) -> TrackedTable {
        T::TABLE
    }

    fn current_row(&self) -> Row {
        self.current.to_row()
    }

    fn history(&self) -> Vec<ColumnHistory> {
        Tracked::history(self)
    }

    fn stash_before_image(&mut self, image: Row) {
        self.before_image = Some(image);
    }

    fn take_before_image(&mut self) -> Option<Row> {
        self.before_image.take()
    }
}

/// Callbacks invoked by the persistence layer around each write
///
/// Implementations must not block: they run inline with the triggering write.
pub trait MutationObserver: Send + Sync {
    fn before_flush(&self, dirty: &mut [&mut dyn Instance]);
    fn after_insert(&self, instance: &dyn Instance);
    fn after_update(&self, instance: &mut dyn Instance);
    fn after_delete(&self, instance: &dyn Instance);
}

/// Builds change records for the registered tables
#[derive(Clone)]
pub struct ChangeInterceptor {
    tables: Vec<TrackedTable>,
    serializer: Serializer,
    queue: ChangeQueue,
}

impl ChangeInterceptor {
    /// Intercept mutations of every [`TrackedTable`]
    pub fn new(serializer: Serializer, queue: ChangeQueue) -> Self {
        Self::for_tables(&TrackedTable::ALL, serializer, queue)
    }

    /// Intercept mutations of `tables` only
    pub fn for_tables(tables: &[TrackedTable], serializer: Serializer, queue: ChangeQueue) -> Self {
        Self {
            tables: tables.to_vec(),
            serializer,
            queue,
        }
    }

    fn tracks(&self, table: TrackedTable) -> bool {
        self.tables.contains(&table)
    }

    /// Serialize a full row, dropping columns that fail to serialize
    fn full_image(&self, table: TrackedTable, row: &Row) -> ColumnImage {
        row.iter()
            .filter_map(|(column, value)| self.normalize_field(table, column, value))
            .map(|(column, json)| (column.to_string(), json))
            .collect()
    }

    fn normalize_field<'a>(
        &self,
        table: TrackedTable,
        column: &'a str,
        value: &FieldValue,
    ) -> Option<(&'a str, serde_json::Value)> {
        match self.serializer.normalize(value) {
            Ok(json) => Some((column, json)),
            Err(e) => {
                warn!(table = %table, column, error = %e, "Omitting column from change image");
                None
            },
        }
    }

    fn emit(
        &self,
        table: TrackedTable,
        operation: Operation,
        before_data: Option<ColumnImage>,
        after_data: Option<ColumnImage>,
    ) {
        let record = NewChangeRecord {
            table_name: table,
            operation,
            before_data,
            after_data,
            actor_id: get_actor(),
            created_at: Utc::now(),
        };
        debug!(table = %table, operation = %operation, actor_id = ?record.actor_id, "Captured change");
        self.queue.enqueue(record);
    }
}

impl MutationObserver for ChangeInterceptor {
    fn before_flush(&self, dirty: &mut [&mut dyn Instance]) {
        for instance in dirty.iter_mut() {
            if !self.tracks(instance.table()) {
                continue;
            }
            let prior: Row = instance
                .history()
                .into_iter()
                .filter(|h| h.column != UPDATED_AT_COLUMN)
                .map(|h| (h.column, h.prior))
                .collect();
            if !prior.is_empty() {
                instance.stash_before_image(prior);
            }
        }
    }

    fn after_update(&self, instance: &mut dyn Instance) {
        let table = instance.table();
        let stashed = instance.take_before_image().unwrap_or_default();
        if !self.tracks(table) {
            return;
        }

        let mut before = ColumnImage::new();
        let mut after = ColumnImage::new();
        for change in instance.history() {
            if change.column == UPDATED_AT_COLUMN {
                continue;
            }
            let prior = stashed.get(change.column).unwrap_or(&change.prior);
            // A column is kept only when both sides serialize, so the two
            // images always cover the same columns.
            let pair = self
                .normalize_field(table, change.column, prior)
                .zip(self.normalize_field(table, change.column, &change.current));
            if let Some(((column, old), (_, new))) = pair {
                before.insert(column.to_string(), old);
                after.insert(column.to_string(), new);
            }
        }

        if !after.is_empty() {
            self.emit(table, Operation::Update, Some(before), Some(after));
        }
    }

    fn after_insert(&self, instance: &dyn Instance) {
        let table = instance.table();
        if self.tracks(table) {
            let after = self.full_image(table, &instance.current_row());
            self.emit(table, Operation::Create, None, Some(after));
        }
    }

    fn after_delete(&self, instance: &dyn Instance) {
        let table = instance.table();
        if self.tracks(table) {
            let before = self.full_image(table, &instance.current_row());
            self.emit(table, Operation::Delete, Some(before), None);
        }
    }
}
