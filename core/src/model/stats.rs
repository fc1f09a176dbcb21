use serde::{Deserialize, Serialize};

use crate::model::task::{Status, Task};

/// Per-status counts for one snapshot of the task list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOverview {
    pub aborted: usize,
    pub underway: usize,
    pub completed: usize,
}

impl StatusOverview {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut overview = Self::default();
        for task in tasks {
            overview.add(task.status);
        }
        overview
    }

    pub fn add(&mut self, status: Status) {
        match status {
            Status::Aborted => self.aborted += 1,
            Status::Underway => self.underway += 1,
            Status::Completed => self.completed += 1,
        }
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Aborted => self.aborted,
            Status::Underway => self.underway,
            Status::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.aborted + self.underway + self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_bucket() {
        let mut tasks = vec![
            Task::new(1, "a".into()),
            Task::new(2, "b".into()),
            Task::new(3, "c".into()),
        ];
        tasks[0].status = Status::Completed;
        tasks[2].status = Status::Aborted;

        let overview = StatusOverview::from_tasks(&tasks);
        assert_eq!(overview.count(Status::Completed), 1);
        assert_eq!(overview.count(Status::Underway), 1);
        assert_eq!(overview.count(Status::Aborted), 1);
        assert_eq!(overview.total(), 3);
    }
}
