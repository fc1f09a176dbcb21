//! Embedded task store.
//!
//! # Responsibility
//! - Own the task records and the file that persists them.
//! - Run scoped write transactions and publish each committed snapshot.
//!
//! # Invariants
//! - Writers are serialized; a transaction commits fully or not at all.
//! - Subscribers always observe a committed snapshot, never a working copy.
//! - Record ids are unique within a snapshot.

mod file;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info};
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::model::task::Task;

use file::TaskFile;

pub use file::{DEFAULT_FILE_NAME, SCHEMA_VERSION};

pub type Snapshot = Arc<Vec<Task>>;

pub struct TaskStore {
    file: Option<TaskFile>,
    write_lock: Mutex<()>,
    publisher: watch::Sender<Snapshot>,
}

impl TaskStore {
    /// Opens the store persisted under `dir`, applying migrations first.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        let dir = dir.as_ref();
        info!("event=store_open module=store status=start mode=file");

        match TaskFile::open(dir) {
            Ok((file, tasks)) => {
                info!(
                    "event=store_open module=store status=ok mode=file tasks={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(Self::with_tasks(Some(file), tasks))
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error mode=file duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Opens a store that lives only as long as the process.
    pub fn in_memory() -> Self {
        info!("event=store_open module=store status=ok mode=memory");
        Self::with_tasks(None, Vec::new())
    }

    fn with_tasks(file: Option<TaskFile>, tasks: Vec<Task>) -> Self {
        let (publisher, _) = watch::channel(Arc::new(tasks));
        Self {
            file,
            write_lock: Mutex::new(()),
            publisher,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.publisher.borrow().clone()
    }

    /// Live query over every record. The receiver starts at the latest commit.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Runs `f` inside a write transaction.
    ///
    /// Changes are persisted and published only when `f` returns `Ok` and
    /// touched something. On any error the working copy is dropped.
    pub fn write<R>(&self, f: impl FnOnce(&mut WriteTxn) -> StoreResult<R>) -> StoreResult<R> {
        let _guard = self.write_lock.lock();
        let started_at = Instant::now();

        let mut txn = WriteTxn {
            tasks: self.snapshot().as_ref().clone(),
            dirty: false,
        };
        let result = f(&mut txn)?;

        if !txn.dirty {
            debug!("event=store_commit module=store status=skipped reason=unchanged");
            return Ok(result);
        }

        if let Some(file) = &self.file {
            if let Err(err) = file.persist(&txn.tasks) {
                error!(
                    "event=store_commit module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        }

        let count = txn.tasks.len();
        self.publisher.send_replace(Arc::new(txn.tasks));
        debug!(
            "event=store_commit module=store status=ok tasks={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Working copy handed to a write transaction.
pub struct WriteTxn {
    tasks: Vec<Task>,
    dirty: bool,
}

impl WriteTxn {
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Re-resolves a record by id against the live contents.
    ///
    /// Edits made through the returned reference only commit after `mark_dirty`.
    pub fn find_latest_mut(&mut self, id: &Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == *id)
    }

    /// Flags the working copy as changed so the commit persists and publishes it.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Inserts `task`, replacing any record with the same id.
    pub fn insert(&mut self, task: Task) -> &Task {
        self.dirty = true;
        let pos = match self.tasks.iter().position(|t| t.id == task.id) {
            Some(pos) => {
                self.tasks[pos] = task;
                pos
            }
            None => {
                self.tasks.push(task);
                self.tasks.len() - 1
            }
        };
        &self.tasks[pos]
    }

    /// Removes the record with `id`. Returns false when it was already gone.
    pub fn delete(&mut self, id: &Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != *id);
        let removed = self.tasks.len() != before;
        self.dirty |= removed;
        removed
    }

    pub fn delete_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.dirty |= removed > 0;
        removed
    }
}
