//! Read-only counts for the statistics panel

use crate::task::{Priority, Status, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardStats {
    /// Non-archived tasks
    pub total: usize,
    pub archived: usize,
    /// Indexed by `Status::index`
    pub by_status: [usize; 3],
    /// Indexed by `Priority::index`
    pub by_priority: [usize; 3],
}

impl BoardStats {
    /// Count tasks by status and priority. Archived tasks only add to `archived`.
    pub fn compute<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            if task.archived {
                stats.archived += 1;
                continue;
            }
            stats.total += 1;
            stats.by_status[task.status.index()] += 1;
            stats.by_priority[task.priority.index()] += 1;
        }
        stats
    }

    pub fn status_count(&self, status: Status) -> usize {
        self.by_status[status.index()]
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.by_priority[priority.index()]
    }

    /// Percentage of tasks in Done, rounded down
    pub fn completion_rate(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.status_count(Status::Done) * 100 / self.total
    }
}
