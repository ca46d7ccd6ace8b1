//! Change record hand-off between request tasks and the change log
//!
//! Producers call [`ChangeQueue::enqueue`], which never awaits. A single
//! [`ChangeConsumer`] task drains the queue in FIFO order and appends each
//! record to the change log through a [`ChangeLogWriter`]. Delivery is
//! best-effort:
//!
//! - a record that fails to persist is logged and dropped
//! - records still queued at shutdown are discarded and counted
//! - with a `max_pending` cap, records arriving at the cap are dropped

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::models::NewChangeRecord;
use super::queries::insert_change_record;
use crate::error::ServerResult;

#[derive(Debug, Default)]
struct Counters {
    pending: AtomicUsize,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

/// Snapshot of queue counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QueueStats {
    /// Records accepted but not yet taken by the consumer
    pub pending: usize,
    pub enqueued: u64,
    /// Records rejected at the cap or after the consumer stopped
    pub dropped: u64,
}

/// Producer side of the change queue
#[derive(Debug, Clone)]
pub struct ChangeQueue {
    tx: mpsc::UnboundedSender<NewChangeRecord>,
    counters: Arc<Counters>,
    max_pending: Option<usize>,
}

/// Consumer side of the change queue
#[derive(Debug)]
pub struct ChangeReceiver {
    rx: mpsc::UnboundedReceiver<NewChangeRecord>,
    counters: Arc<Counters>,
}

impl ChangeQueue {
    /// Create a queue with no cap on pending records
    pub fn unbounded() -> (Self, ChangeReceiver) {
        Self::with_max_pending(0)
    }

    /// Create a queue holding at most `max_pending` records (0 = no cap)
    pub fn with_max_pending(max_pending: usize) -> (Self, ChangeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let queue = Self {
            tx,
            counters: Arc::clone(&counters),
            max_pending: (max_pending > 0).then_some(max_pending),
        };
        (queue, ChangeReceiver { rx, counters })
    }

    /// Hand a record to the consumer without waiting
    ///
    /// Returns `false` when the record was dropped.
    pub fn enqueue(&self, record: NewChangeRecord) -> bool {
        let before = self.counters.pending.fetch_add(1, Ordering::AcqRel);
        if let Some(max) = self.max_pending {
            if before >= max {
                self.counters.pending.fetch_sub(1, Ordering::AcqRel);
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    table = %record.table_name,
                    operation = %record.operation,
                    max_pending = max,
                    "Change queue full, dropping record"
                );
                return false;
            }
        }

        match self.tx.send(record) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            },
            Err(mpsc::error::SendError(record)) => {
                self.counters.pending.fetch_sub(1, Ordering::AcqRel);
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    table = %record.table_name,
                    operation = %record.operation,
                    "Change consumer stopped, dropping record"
                );
                false
            },
        }
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.counters.pending.load(Ordering::Acquire),
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl ChangeReceiver {
    pub async fn recv(&mut self) -> Option<NewChangeRecord> {
        let record = self.rx.recv().await;
        if record.is_some() {
            self.counters.pending.fetch_sub(1, Ordering::AcqRel);
        }
        record
    }

    pub fn try_recv(&mut self) -> Result<NewChangeRecord, TryRecvError> {
        let record = self.rx.try_recv()?;
        self.counters.pending.fetch_sub(1, Ordering::AcqRel);
        Ok(record)
    }

    /// Stop accepting records; already queued ones stay readable
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Durable destination of change records
#[async_trait]
pub trait ChangeLogWriter: Send + Sync + 'static {
    async fn append(&self, record: &NewChangeRecord) -> ServerResult<()>;
}

#[async_trait]
impl ChangeLogWriter for PgPool {
    async fn append(&self, record: &NewChangeRecord) -> ServerResult<()> {
        insert_change_record(self, record).await.map(|_| ())
    }
}

/// Outcome counters of a consumer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConsumerStats {
    pub persisted: u64,
    pub failed: u64,
    /// Records left in the queue when the consumer was cancelled
    pub discarded: u64,
    /// Records the queue rejected before they reached the consumer
    pub dropped: u64,
}

/// The single task draining the change queue
pub struct ChangeConsumer<W> {
    receiver: ChangeReceiver,
    writer: W,
    token: CancellationToken,
    stats: ConsumerStats,
}

impl<W: ChangeLogWriter> ChangeConsumer<W> {
    /// Spawn the consumer loop
    pub fn start(receiver: ChangeReceiver, writer: W, token: CancellationToken) -> ConsumerHandle {
        let consumer = Self {
            receiver,
            writer,
            token: token.clone(),
            stats: ConsumerStats::default(),
        };
        let join = tokio::spawn(consumer.run());
        info!("Change log consumer started");
        ConsumerHandle { token, join }
    }

    async fn run(mut self) -> ConsumerStats {
        loop {
            let record = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                record = self.receiver.recv() => match record {
                    Some(record) => record,
                    None => break,
                },
            };

            match self.writer.append(&record).await {
                Ok(()) => {
                    self.stats.persisted += 1;
                    debug!(
                        table = %record.table_name,
                        operation = %record.operation,
                        "Change record persisted"
                    );
                },
                Err(e) => {
                    self.stats.failed += 1;
                    error!(
                        table = %record.table_name,
                        operation = %record.operation,
                        error = %e,
                        "Failed to persist change record"
                    );
                },
            }
        }

        self.receiver.close();
        while self.receiver.try_recv().is_ok() {
            self.stats.discarded += 1;
        }
        self.stats.dropped = self.receiver.counters.dropped.load(Ordering::Relaxed);

        info!(
            persisted = self.stats.persisted,
            failed = self.stats.failed,
            discarded = self.stats.discarded,
            dropped = self.stats.dropped,
            "Change log consumer stopped"
        );
        self.stats
    }
}

/// Handle to a running [`ChangeConsumer`]
pub struct ConsumerHandle {
    token: CancellationToken,
    join: JoinHandle<ConsumerStats>,
}

impl ConsumerHandle {
    /// Cancel the consumer and wait for it to finish
    ///
    /// A record already being written completes; queued records are discarded.
    pub async fn shutdown(self) -> ConsumerStats {
        self.token.cancel();
        match self.join.await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "Change log consumer task failed");
                ConsumerStats::default()
            },
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
