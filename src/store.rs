//! CSV-backed task storage
//!
//! Every operation works on the whole file: read all rows, change the
//! in-memory board, write all rows back. Writes go to a sibling temporary
//! file that is renamed over the target once complete.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::kanban_board::KanbanBoard;
use crate::task::{Task, TaskFields, TaskPatch};

/// Column names, in the order fields are written
pub const HEADER: [&str; 8] = [
    "id",
    "title",
    "description",
    "status",
    "due_date",
    "priority",
    "assignee",
    "archived",
];

/// Rows shown in the diagnostics preview
const PREVIEW_ROWS: usize = 3;

/// What the task file looks like on disk right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDiagnostics {
    pub path: PathBuf,
    /// File size in bytes, `None` when the file does not exist
    pub size: Option<u64>,
    /// Header row as found in the file
    pub columns: Vec<String>,
    /// Row count, or why the file could not be read
    pub rows: std::result::Result<usize, String>,
    /// Titles of the first few rows
    pub preview: Vec<String>,
}

impl StoreDiagnostics {
    pub fn exists(&self) -> bool {
        self.size.is_some()
    }

    pub fn is_readable(&self) -> bool {
        self.rows.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Open the store, creating an empty file with a header row when none
    /// exists. Fails if the file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            info!(path = %store.path.display(), "creating empty task file");
            store.save(&[])?;
        }
        let tasks = store.list_all()?;
        info!(path = %store.path.display(), count = tasks.len(), "task store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored task, archived ones included, in file order
    pub fn list_all(&self) -> Result<Vec<Task>> {
        Ok(self.load()?.into_tasks())
    }

    pub fn load(&self) -> Result<KanbanBoard> {
        let data =
            fs::read_to_string(&self.path).map_err(|e| BoardError::storage(&self.path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());
        let tasks = reader
            .deserialize::<Task>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| BoardError::csv(&self.path, e))?;
        debug!(path = %self.path.display(), count = tasks.len(), "tasks loaded");
        KanbanBoard::from_tasks(tasks)
    }

    /// Replace the stored collection with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let bytes = self.encode(tasks)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BoardError::storage(parent, e))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, bytes).map_err(|e| BoardError::storage(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            BoardError::storage(&self.path, e)
        })?;

        info!(path = %self.path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }

    fn encode(&self, tasks: &[Task]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(HEADER)
            .map_err(|e| BoardError::csv(&self.path, e))?;
        for task in tasks {
            writer
                .serialize(task)
                .map_err(|e| BoardError::csv(&self.path, e))?;
        }
        writer
            .into_inner()
            .map_err(|e| BoardError::storage(&self.path, e.into_error()))
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where [`TaskStore::rebuild`] keeps the previous file
    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".backup")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Inspect the file without failing: existence, size, header and rows.
    pub fn diagnose(&self) -> StoreDiagnostics {
        let size = fs::metadata(&self.path).ok().map(|m| m.len());
        let columns: Vec<String> = csv::Reader::from_path(&self.path)
            .and_then(|mut reader| {
                Ok(reader.headers()?.iter().map(str::to_string).collect())
            })
            .unwrap_or_default();
        let (rows, preview) = match self.list_all() {
            Ok(tasks) => (
                Ok(tasks.len()),
                tasks
                    .into_iter()
                    .take(PREVIEW_ROWS)
                    .map(|t| t.title)
                    .collect(),
            ),
            Err(e) => (Err(e.to_string()), Vec::new()),
        };
        debug!(path = %self.path.display(), ?size, rows = ?rows, "store diagnosed");
        StoreDiagnostics {
            path: self.path.clone(),
            size,
            columns,
            rows,
            preview,
        }
    }

    /// Rewrite the file from `tasks` in the canonical column layout.
    ///
    /// The new content is written to a `.new` sibling and read back before
    /// it replaces the file. The previous file, if any, is copied to
    /// [`TaskStore::backup_path`] first.
    pub fn rebuild(&self, tasks: &[Task]) -> Result<()> {
        let staged = Self {
            path: self.sibling(".new"),
        };
        staged.save(tasks)?;
        let check = staged.list_all().and_then(|read| {
            if read.len() == tasks.len() {
                Ok(())
            } else {
                Err(BoardError::storage(
                    &staged.path,
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("wrote {} rows, read back {}", tasks.len(), read.len()),
                    ),
                ))
            }
        });
        if let Err(e) = check {
            let _ = fs::remove_file(&staged.path);
            return Err(e);
        }

        if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|e| BoardError::storage(&backup, e))?;
        }
        fs::rename(&staged.path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staged.path);
            BoardError::storage(&self.path, e)
        })?;
        info!(path = %self.path.display(), count = tasks.len(), "task file rebuilt");
        Ok(())
    }

    /// Load, apply `f` to the board, and save. Nothing is written if `f` fails.
    pub fn modify<T>(&self, f: impl FnOnce(&mut KanbanBoard) -> Result<T>) -> Result<T> {
        let mut board = self.load()?;
        let out = f(&mut board)?;
        self.save(board.tasks())?;
        Ok(out)
    }

    pub fn create(&self, fields: TaskFields) -> Result<Task> {
        self.modify(|board| board.add_task(fields).cloned())
    }

    pub fn update(&self, id: Uuid, patch: impl Into<TaskPatch>) -> Result<Task> {
        let patch = patch.into();
        self.modify(|board| board.update_task(id, patch).cloned())
    }

    pub fn delete(&self, id: Uuid) -> Result<Task> {
        self.modify(|board| board.delete_task(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Status};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TaskStore {
        TaskStore::open(dir.path().join("data").join("tasks.csv")).unwrap()
    }

    #[test]
    fn test_open_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content.trim_end(),
            "id,title,description,status,due_date,priority,assignee,archived"
        );
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut board = KanbanBoard::new();
        board
            .add_task(
                TaskFields::new("Fix \"login\", again")
                    .description("line one\nline two, with comma")
                    .status(Status::InProgress)
                    .due_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
                    .priority(Priority::High)
                    .assignee("Ana"),
            )
            .unwrap();
        board.add_task(TaskFields::new("Bare")).unwrap();
        let id = board.tasks()[1].id;
        board.archive(id).unwrap();
        let blanked = board
            .add_task(TaskFields::new("Blanked").description("x").assignee("y"))
            .unwrap()
            .id;
        board
            .update_task(
                blanked,
                TaskPatch {
                    description: Some(Some(String::new())),
                    assignee: Some(Some(String::new())),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        store.save(board.tasks()).unwrap();
        assert_eq!(store.list_all().unwrap(), board.tasks());
    }

    #[test]
    fn test_reads_legacy_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        let id = Uuid::new_v4();
        fs::write(
            &path,
            format!(
                "title,description,status,due_date,priority,assignee,created_date,id,archived\n\
                 Old task,,Done,2024-03-01,Low,,2024-01-01,{id},True\n"
            ),
        )
        .unwrap();

        let tasks = TaskStore::open(&path).unwrap().list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].status, Status::Done);
        assert_eq!(tasks[0].description(), None);
        assert!(tasks[0].archived);
    }

    #[test]
    fn test_nan_text_cells_load_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        let id = Uuid::new_v4();
        fs::write(
            &path,
            format!(
                "id,title,description,status,due_date,priority,assignee,archived
                 {id},Imported,nan,To Do,,Low,nan,False
"
            ),
        )
        .unwrap();

        let tasks = TaskStore::open(&path).unwrap().list_all().unwrap();
        assert_eq!(tasks[0].description(), None);
        assert_eq!(tasks[0].assignee(), None);
    }

    #[test]
    fn test_missing_archived_column_defaults_to_false() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        let id = Uuid::new_v4();
        fs::write(
            &path,
            format!("id,title,description,status,due_date,priority,assignee\n{id},t,,To Do,,Medium,\n"),
        )
        .unwrap();
        let tasks = TaskStore::open(&path).unwrap().list_all().unwrap();
        assert!(!tasks[0].archived);
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        fs::write(&path, "id,title,status\nnot-a-uuid,x,Sideways\n").unwrap();
        assert!(matches!(TaskStore::open(&path), Err(BoardError::Csv { .. })));
    }

    #[test]
    fn test_directory_path_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            TaskStore::open(dir.path()),
            Err(BoardError::Storage { .. })
        ));
    }

    #[test]
    fn test_create_update_delete() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let task = store.create(TaskFields::new("Write tests")).unwrap();
        let updated = store
            .update(task.id, TaskPatch::status(Status::Done))
            .unwrap();
        assert_eq!(updated.status, Status::Done);
        assert_eq!(store.list_all().unwrap()[0].status, Status::Done);

        store.delete(task.id).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_create_with_empty_title_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.create(TaskFields::new("")).unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store
            .update(Uuid::new_v4(), TaskPatch::title("x"))
            .unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
    }

    #[test]
    fn test_delete_unknown_id_leaves_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.create(TaskFields::new("keep")).unwrap();
        let before = fs::read(store.path()).unwrap();

        let err = store.delete(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_diagnose_reports_rows_and_columns() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for title in ["one", "two", "three", "four"] {
            store.create(TaskFields::new(title)).unwrap();
        }

        let report = store.diagnose();
        assert!(report.exists());
        assert!(report.size.unwrap() > 0);
        assert_eq!(report.columns, HEADER);
        assert_eq!(report.rows, Ok(4));
        assert_eq!(report.preview, ["one", "two", "three"]);
    }

    #[test]
    fn test_diagnose_unreadable_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "id,title,status
not-a-uuid,x,Sideways
").unwrap();
        let report = store.diagnose();
        assert!(report.exists());
        assert!(!report.is_readable());
        assert_eq!(report.columns, ["id", "title", "status"]);

        fs::remove_file(store.path()).unwrap();
        let report = store.diagnose();
        assert!(!report.exists());
        assert!(report.columns.is_empty());
    }

    #[test]
    fn test_rebuild_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        let id = Uuid::new_v4();
        let legacy = format!(
            "title,description,status,due_date,priority,assignee,created_date,id,archived\n\
             Old,nan,Done,,Low,nan,2024-01-01,{id},False\n"
        );
        fs::write(&path, &legacy).unwrap();
        let store = TaskStore::open(&path).unwrap();

        let tasks = store.list_all().unwrap();
        store.rebuild(&tasks).unwrap();

        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), legacy);
        let rebuilt = fs::read_to_string(&path).unwrap();
        assert!(rebuilt.starts_with(&format!("{}\n", HEADER.join(","))));
        assert_eq!(store.list_all().unwrap(), tasks);
        assert!(!dir.path().join("tasks.csv.new").exists());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.create(TaskFields::new("a")).unwrap();
        assert!(!store.temp_path().exists());
    }
}
