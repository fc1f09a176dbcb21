use std::sync::Arc;

use log::info;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::model::stats::StatusOverview;
use crate::model::task::{is_blank, Status, Task};
use crate::store::{Snapshot, TaskStore};

/// Observable view of every task record.
///
/// Each feed replays the latest committed snapshot on creation, then
/// reports every later commit. Dropping the feed ends the subscription.
pub struct TaskFeed {
    rx: watch::Receiver<Snapshot>,
}

impl TaskFeed {
    pub fn latest(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Returns the new snapshot if a commit landed since the last read.
    pub fn refresh(&mut self) -> Option<Snapshot> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Waits for the next commit. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

pub struct TaskService {
    store: Arc<TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    pub fn observe_all(&self) -> TaskFeed {
        TaskFeed {
            rx: self.store.subscribe(),
        }
    }

    pub fn tasks(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn overview(&self) -> StatusOverview {
        StatusOverview::from_tasks(&self.store.snapshot())
    }

    /// Adds a task at the end of the list. Blank notes are ignored.
    pub fn add(&self, note: &str) -> StoreResult<Option<Task>> {
        if is_blank(note) {
            return Ok(None);
        }

        let created = self.store.write(|txn| {
            let sequence_number = txn.count() as u32 + 1;
            Ok(txn.insert(Task::new(sequence_number, note.to_string())).clone())
        })?;
        info!(
            "event=task_add module=service status=ok id={} sequence_number={}",
            created.id, created.sequence_number
        );
        Ok(Some(created))
    }

    /// Writes `new_note` when non-blank and `new_status` when it differs.
    ///
    /// Returns false without writing when the record no longer exists.
    pub fn update(&self, task: &Task, new_note: &str, new_status: Status) -> StoreResult<bool> {
        let found = self.store.write(|txn| {
            let Some(latest) = txn.find_latest_mut(&task.id) else {
                return Ok(false);
            };
            let mut changed = false;
            if !is_blank(new_note) && latest.note != new_note {
                latest.note = new_note.to_string();
                changed = true;
            }
            if latest.status != new_status {
                latest.status = new_status;
                changed = true;
            }
            if changed {
                txn.mark_dirty();
            }
            Ok(true)
        })?;
        info!(
            "event=task_update module=service status={} id={}",
            if found { "ok" } else { "missing" },
            task.id
        );
        Ok(found)
    }

    /// Removes `task` if it is still present.
    pub fn delete_one(&self, task: &Task) -> StoreResult<bool> {
        let removed = self.store.write(|txn| Ok(txn.delete(&task.id)))?;
        info!(
            "event=task_delete module=service status={} id={}",
            if removed { "ok" } else { "missing" },
            task.id
        );
        Ok(removed)
    }

    pub fn delete_all(&self) -> StoreResult<usize> {
        let removed = self.store.write(|txn| Ok(txn.delete_all()))?;
        info!("event=task_clear module=service status=ok removed={}", removed);
        Ok(removed)
    }

    pub fn find_by_sequence(&self, sequence_number: u32) -> Option<Task> {
        self.store
            .snapshot()
            .iter()
            .find(|t| t.sequence_number == sequence_number)
            .cloned()
    }

    /// Resolves a task by id prefix. Ambiguous prefixes resolve to nothing.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Option<Task> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let snapshot = self.store.snapshot();
        let mut matches = snapshot
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(task.clone()),
            _ => None,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Task> {
        self.store.snapshot().iter().find(|t| t.id == *id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TaskService {
        TaskService::new(Arc::new(TaskStore::in_memory()))
    }

    #[test]
    fn fresh_feed_starts_empty() {
        let service = service();
        let feed = service.observe_all();
        assert!(feed.latest().is_empty());
    }

    #[test]
    fn refresh_reports_each_commit_once() {
        let service = service();
        let mut feed = service.observe_all();
        assert!(feed.refresh().is_none());

        service.add("Buy milk").unwrap();
        let snapshot = feed.refresh().expect("commit should be visible");
        assert_eq!(snapshot.len(), 1);
        assert!(feed.refresh().is_none());
    }

    #[test]
    fn blank_add_does_not_notify() {
        let service = service();
        let mut feed = service.observe_all();
        assert!(service.add("  ").unwrap().is_none());
        assert!(feed.refresh().is_none());
    }

    #[test]
    fn sequence_number_is_count_plus_one_without_renumbering() {
        let service = service();
        let first = service.add("one").unwrap().unwrap();
        service.add("two").unwrap();
        service.delete_one(&first).unwrap();
        let third = service.add("three").unwrap().unwrap();

        // One record left, so the new one is #2 and collides with "two".
        assert_eq!(third.sequence_number, 2);
        let numbers: Vec<u32> = service.tasks().iter().map(|t| t.sequence_number).collect();
        assert_eq!(numbers, vec![2, 2]);
    }

    #[test]
    fn update_of_deleted_task_is_a_no_op() {
        let service = service();
        let task = service.add("gone soon").unwrap().unwrap();
        service.delete_all().unwrap();

        assert!(!service.update(&task, "revived", Status::Completed).unwrap());
        assert!(service.tasks().is_empty());
    }

    #[test]
    fn update_works_from_a_stale_copy() {
        let service = service();
        let stale = service.add("draft").unwrap().unwrap();
        service.update(&stale, "", Status::Aborted).unwrap();

        // The stale copy still says Underway; only the note changes.
        service.update(&stale, "final", Status::Aborted).unwrap();
        let latest = service.get(&stale.id).unwrap();
        assert_eq!(latest.note, "final");
        assert_eq!(latest.status, Status::Aborted);
    }

    #[test]
    fn update_that_changes_nothing_does_not_notify() {
        let service = service();
        let task = service.add("Walk dog").unwrap().unwrap();
        let mut feed = service.observe_all();

        assert!(service.update(&task, "   ", Status::Underway).unwrap());
        assert!(service.update(&task, "Walk dog", Status::Underway).unwrap());
        assert!(feed.refresh().is_none());

        assert!(service.update(&task, "", Status::Completed).unwrap());
        assert_eq!(feed.refresh().unwrap()[0].status, Status::Completed);
    }

    #[test]
    fn find_helpers() {
        let service = service();
        let task = service.add("Read").unwrap().unwrap();

        assert_eq!(service.find_by_sequence(1).map(|t| t.id), Some(task.id));
        assert!(service.find_by_sequence(9).is_none());
        let prefix = &task.id.to_string()[..8];
        assert_eq!(service.find_by_id_prefix(prefix).map(|t| t.id), Some(task.id));
        assert!(service.find_by_id_prefix("").is_none());
    }

    #[tokio::test]
    async fn changed_wakes_on_commit() {
        let service = service();
        let mut feed = service.observe_all();
        service.add("async").unwrap();
        let snapshot = feed.changed().await.unwrap();
        assert_eq!(snapshot[0].note, "async");
    }
}
