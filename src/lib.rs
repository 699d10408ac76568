//! A single-page kanban board persisted to a CSV file.
//!
//! Tasks move through three fixed columns (To Do, In Progress, Done). The
//! store, board, search and statistics are plain functions over an owned
//! in-memory collection; `ui` is the terminal front end driving them.

pub mod config;
pub mod error;
pub mod filter;
pub mod kanban_board;
pub mod logging;
pub mod stats;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{BoardError, Result};
pub use kanban_board::{ColumnOrder, Direction, KanbanBoard};
pub use stats::BoardStats;
pub use store::{StoreDiagnostics, TaskStore};
pub use task::{DueStatus, Priority, Status, Task, TaskFields, TaskPatch};
