use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::task::{Status, Task, TaskFields, TaskPatch};

/// Direction for stepping a task to the adjacent column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// How the tasks inside a column are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Order in which tasks were created
    #[default]
    Insertion,
    /// Earliest due date first, undated tasks last
    DueDate,
}

impl ColumnOrder {
    pub fn toggle(self) -> Self {
        match self {
            ColumnOrder::Insertion => ColumnOrder::DueDate,
            ColumnOrder::DueDate => ColumnOrder::Insertion,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnOrder::Insertion => "created",
            ColumnOrder::DueDate => "due date",
        }
    }

    /// Reorder a column in place. The sort is stable so ties keep insertion order.
    pub fn apply(self, tasks: &mut [&Task]) {
        if self == ColumnOrder::DueDate {
            tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        }
    }
}

/// The in-memory task collection, in insertion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KanbanBoard {
    tasks: Vec<Task>,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Wrap a loaded collection, rejecting duplicate ids.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(BoardError::DuplicateId { id: task.id });
            }
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(BoardError::NotFound { id })
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(BoardError::NotFound { id })
    }

    pub fn add_task(&mut self, fields: TaskFields) -> Result<&Task> {
        let mut task = Task::new(fields)?;
        while self.tasks.iter().any(|t| t.id == task.id) {
            task.id = Uuid::new_v4();
        }
        debug!(id = %task.id, title = %task.title, "task added");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> Result<&Task> {
        let task = self.get_mut(id)?;
        task.apply(patch)?;
        debug!(%id, "task updated");
        Ok(&*task)
    }

    /// Remove a task permanently
    pub fn delete_task(&mut self, id: Uuid) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(BoardError::NotFound { id })?;
        debug!(%id, "task deleted");
        Ok(self.tasks.remove(index))
    }

    /// Step a task one column over. Returns the new status, or `None` when
    /// the task is already in the outermost column on that side.
    pub fn move_task(&mut self, id: Uuid, direction: Direction) -> Result<Option<Status>> {
        let task = self.get_mut(id)?;
        let target = match direction {
            Direction::Left => task.status.prev(),
            Direction::Right => task.status.next(),
        };
        if let Some(status) = target {
            task.status = status;
        }
        Ok(target)
    }

    /// Put a task in a named column. Returns whether the status changed.
    pub fn set_status(&mut self, id: Uuid, status: Status) -> Result<bool> {
        let task = self.get_mut(id)?;
        let changed = task.status != status;
        task.status = status;
        Ok(changed)
    }

    pub fn archive(&mut self, id: Uuid) -> Result<&Task> {
        self.update_task(id, TaskPatch::archived(true))
    }

    pub fn unarchive(&mut self, id: Uuid) -> Result<&Task> {
        self.update_task(id, TaskPatch::archived(false))
    }

    /// Archive every visible task in the Done column, returning how many.
    pub fn archive_done(&mut self) -> usize {
        let mut count = 0;
        for task in self
            .tasks
            .iter_mut()
            .filter(|t| !t.archived && t.status == Status::Done)
        {
            task.archived = true;
            count += 1;
        }
        count
    }

    /// Bring every archived task back onto the board, returning how many.
    pub fn restore_archived(&mut self) -> usize {
        let mut count = 0;
        for task in self.tasks.iter_mut().filter(|t| t.archived) {
            task.archived = false;
            count += 1;
        }
        count
    }

    /// Non-archived tasks in one column, in insertion order
    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.archived && t.status == status)
            .collect()
    }

    pub fn archived_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.archived).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn board_with(titles: &[&str]) -> (KanbanBoard, Vec<Uuid>) {
        let mut board = KanbanBoard::new();
        let ids = titles
            .iter()
            .map(|t| board.add_task(TaskFields::new(*t)).unwrap().id)
            .collect();
        (board, ids)
    }

    #[test]
    fn test_add_rejects_empty_title_without_storing() {
        let mut board = KanbanBoard::new();
        assert!(board.add_task(TaskFields::new("")).is_err());
        assert!(board.is_empty());
    }

    #[test]
    fn test_move_to_in_progress_twice_then_back() {
        let (mut board, ids) = board_with(&["task"]);
        assert!(board.set_status(ids[0], Status::InProgress).unwrap());
        assert!(!board.set_status(ids[0], Status::InProgress).unwrap());
        board.move_task(ids[0], Direction::Left).unwrap();
        assert_eq!(board.get(ids[0]).unwrap().status, Status::ToDo);
    }

    #[test]
    fn test_move_stops_at_the_edges() {
        let (mut board, ids) = board_with(&["task"]);
        assert_eq!(board.move_task(ids[0], Direction::Left).unwrap(), None);
        assert_eq!(board.get(ids[0]).unwrap().status, Status::ToDo);

        board.move_task(ids[0], Direction::Right).unwrap();
        assert_eq!(
            board.move_task(ids[0], Direction::Right).unwrap(),
            Some(Status::Done)
        );
        assert_eq!(board.move_task(ids[0], Direction::Right).unwrap(), None);
        assert_eq!(board.get(ids[0]).unwrap().status, Status::Done);
    }

    #[test]
    fn test_archive_hides_task_from_columns() {
        let (mut board, ids) = board_with(&["a", "b"]);
        board.archive(ids[0]).unwrap();
        for status in Status::ALL {
            assert!(board.get_tasks_by_status(status).iter().all(|t| t.id != ids[0]));
        }
        assert_eq!(board.len(), 2);
        assert!(board.get(ids[0]).unwrap().archived);
        assert_eq!(board.archived_tasks().len(), 1);

        board.unarchive(ids[0]).unwrap();
        assert_eq!(board.get_tasks_by_status(Status::ToDo).len(), 2);
    }

    #[test]
    fn test_columns_keep_insertion_order() {
        let (mut board, ids) = board_with(&["a", "b", "c"]);
        board.set_status(ids[1], Status::Done).unwrap();
        let todo: Vec<_> = board
            .get_tasks_by_status(Status::ToDo)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(todo, ["a", "c"]);
    }

    #[test]
    fn test_delete_unknown_id_leaves_board_unchanged() {
        let (mut board, _) = board_with(&["a"]);
        let before = board.clone();
        let err = board.delete_task(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_archive_done_and_restore() {
        let (mut board, ids) = board_with(&["a", "b", "c"]);
        board.set_status(ids[0], Status::Done).unwrap();
        board.set_status(ids[2], Status::Done).unwrap();
        assert_eq!(board.archive_done(), 2);
        assert!(board.get_tasks_by_status(Status::Done).is_empty());
        assert_eq!(board.restore_archived(), 2);
        assert_eq!(board.get_tasks_by_status(Status::Done).len(), 2);
    }

    #[test]
    fn test_from_tasks_rejects_duplicate_ids() {
        let (board, _) = board_with(&["a"]);
        let mut tasks = board.into_tasks();
        tasks.push(tasks[0].clone());
        assert!(matches!(
            KanbanBoard::from_tasks(tasks),
            Err(BoardError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_due_date_order_puts_undated_last() {
        let mut board = KanbanBoard::new();
        let date = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        board.add_task(TaskFields::new("undated")).unwrap();
        board
            .add_task(TaskFields::new("late").due_date(date("2024-05-01")))
            .unwrap();
        board
            .add_task(TaskFields::new("early").due_date(date("2024-01-01")))
            .unwrap();

        let mut column = board.get_tasks_by_status(Status::ToDo);
        ColumnOrder::DueDate.apply(&mut column);
        let titles: Vec<_> = column.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["early", "late", "undated"]);

        let mut column = board.get_tasks_by_status(Status::ToDo);
        ColumnOrder::Insertion.apply(&mut column);
        assert_eq!(column[0].title, "undated");
    }
}
