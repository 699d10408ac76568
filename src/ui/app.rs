//! Board state and key handling
//!
//! Every user action goes through [`App::dispatch`]: reload from the store,
//! apply to the in-memory board, write the whole collection back. A failed
//! read aborts the action; a failed write keeps the change in memory until a
//! retry succeeds.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::filter;
use crate::kanban_board::{ColumnOrder, Direction, KanbanBoard};
use crate::stats::BoardStats;
use crate::store::{StoreDiagnostics, TaskStore};
use crate::task::{Status, Task, TaskFields, TaskPatch};
use crate::ui::form::{FormOutcome, TaskForm};

/// A change to the task collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create(TaskFields),
    Update(Uuid, TaskPatch),
    Move(Uuid, Direction),
    MoveTo(Uuid, Status),
    Archive(Uuid),
    Unarchive(Uuid),
    Delete(Uuid),
    ArchiveDone,
    RestoreArchived,
}

impl Action {
    /// Apply to the board, returning a message for the user
    fn apply(self, board: &mut KanbanBoard) -> Result<String> {
        Ok(match self {
            Action::Create(fields) => {
                let task = board.add_task(fields)?;
                format!("Task '{}' added", task.title)
            }
            Action::Update(id, patch) => {
                let task = board.update_task(id, patch)?;
                format!("Task '{}' updated", task.title)
            }
            Action::Move(id, direction) => match board.move_task(id, direction)? {
                Some(status) => format!("Task '{}' moved to {status}", board.get(id)?.title),
                None => String::new(),
            },
            Action::MoveTo(id, status) => {
                if board.set_status(id, status)? {
                    format!("Task '{}' moved to {status}", board.get(id)?.title)
                } else {
                    String::new()
                }
            }
            Action::Archive(id) => format!("Task '{}' archived", board.archive(id)?.title),
            Action::Unarchive(id) => format!("Task '{}' restored", board.unarchive(id)?.title),
            Action::Delete(id) => format!("Task '{}' deleted", board.delete_task(id)?.title),
            Action::ArchiveDone => format!("{} done task(s) archived", board.archive_done()),
            Action::RestoreArchived => format!("{} task(s) restored", board.restore_archived()),
        })
    }
}

/// Severity of the status-bar message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    pub fn color(self) -> Color {
        match self {
            MessageLevel::Info => Color::Blue,
            MessageLevel::Success => Color::Green,
            MessageLevel::Warning => Color::Yellow,
            MessageLevel::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Board,
    Archive,
}

/// Input layer on top of the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Search,
    Form(TaskForm),
    ConfirmDelete { id: Uuid, title: String },
    Diagnostics(StoreDiagnostics),
}

pub struct App {
    store: TaskStore,
    board: KanbanBoard,
    /// In-memory changes the last save failed to write
    unsaved: bool,
    pub view: View,
    pub overlay: Overlay,
    pub selected_status: Status,
    pub selected_task: usize,
    pub archive_selected: usize,
    pub query: String,
    pub order: ColumnOrder,
    pub message: Option<Message>,
    quit_requested: bool,
    should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore) -> Result<Self> {
        let board = store.load()?;
        Ok(Self {
            store,
            board,
            unsaved: false,
            view: View::Board,
            overlay: Overlay::None,
            selected_status: Status::ToDo,
            selected_task: 0,
            archive_selected: 0,
            query: String::new(),
            order: ColumnOrder::default(),
            message: None,
            quit_requested: false,
            should_quit: false,
        })
    }

    pub fn board(&self) -> &KanbanBoard {
        &self.board
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats::compute(self.board.tasks())
    }

    fn notify(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.message = Some(Message {
            level,
            text: text.into(),
        });
    }

    /// Re-read the store, unless a failed save is still pending.
    pub fn refresh(&mut self) {
        if self.unsaved {
            return;
        }
        match self.store.load() {
            Ok(board) => self.board = board,
            Err(e) => {
                warn!(error = %e, "reload failed, keeping in-memory tasks");
                self.notify(MessageLevel::Error, format!("Could not reload tasks: {e}"));
            }
        }
        self.clamp_selection();
    }

    /// Read, apply and write back. Read, validation and lookup errors are
    /// returned without touching the store; save errors are kept as a
    /// pending retry.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        if !self.unsaved {
            self.board = self.store.load().inspect_err(|e| {
                error!(error = %e, ?action, "reload failed, action not applied");
            })?;
        }
        info!(?action, "applying action");
        let mut board = self.board.clone();
        let text = action.apply(&mut board)?;
        self.board = board;
        self.persist();
        if !self.unsaved && !text.is_empty() {
            self.notify(MessageLevel::Success, text);
        }
        self.clamp_selection();
        Ok(())
    }

    fn persist(&mut self) {
        match self.store.save(self.board.tasks()) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                error!(error = %e, "save failed");
                self.unsaved = true;
                self.notify(
                    MessageLevel::Error,
                    format!("Save failed: {e}. Press r to retry"),
                );
            }
        }
    }

    /// Try again to write a change that failed to save
    pub fn retry_save(&mut self) {
        if !self.unsaved {
            self.notify(MessageLevel::Info, "Nothing to save");
            return;
        }
        self.persist();
        if !self.unsaved {
            info!("pending changes saved on retry");
            self.notify(MessageLevel::Success, "Changes saved");
        }
    }

    /// Dispatch and report any error in the status bar
    fn run(&mut self, action: Action) {
        if let Err(e) = self.dispatch(action) {
            self.report(&e);
        }
    }

    fn report(&mut self, e: &BoardError) {
        if e.is_storage() {
            self.notify(MessageLevel::Error, format!("Task file unreadable: {e}"));
        } else {
            warn!(error = %e, "action rejected");
            self.notify(MessageLevel::Warning, e.to_string());
        }
    }

    pub fn open_diagnostics(&mut self) {
        self.overlay = Overlay::Diagnostics(self.store.diagnose());
    }

    /// Rewrite the task file from the current tasks, keeping a backup of
    /// the old one. Pending unsaved changes are written too.
    pub fn rebuild(&mut self) {
        if !self.unsaved {
            match self.store.load() {
                Ok(board) => self.board = board,
                Err(e) => warn!(error = %e, "rebuilding from in-memory tasks"),
            }
        }
        match self.store.rebuild(self.board.tasks()) {
            Ok(()) => {
                self.unsaved = false;
                self.notify(
                    MessageLevel::Success,
                    format!(
                        "Task file rebuilt, previous copy at {}",
                        self.store.backup_path().display()
                    ),
                );
            }
            Err(e) => {
                error!(error = %e, "rebuild failed");
                self.notify(MessageLevel::Error, format!("Rebuild failed: {e}"));
            }
        }
        self.clamp_selection();
    }

    /// Tasks shown in a board column after search and ordering
    pub fn visible_column(&self, status: Status) -> Vec<&Task> {
        let mut column = filter::filter_tasks(self.board.get_tasks_by_status(status), &self.query);
        self.order.apply(&mut column);
        column
    }

    pub fn visible_archive(&self) -> Vec<&Task> {
        filter::filter_tasks(self.board.archived_tasks(), &self.query)
    }

    pub fn selected_task_id(&self) -> Option<Uuid> {
        match self.view {
            View::Board => self
                .visible_column(self.selected_status)
                .get(self.selected_task)
                .map(|t| t.id),
            View::Archive => self
                .visible_archive()
                .get(self.archive_selected)
                .map(|t| t.id),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_column(self.selected_status).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
        let len = self.visible_archive().len();
        self.archive_selected = self.archive_selected.min(len.saturating_sub(1));
    }

    /// Keep the cursor on a task after it changes column
    fn follow(&mut self, id: Uuid) {
        let status = match self.board.get(id) {
            Ok(task) if !task.archived => task.status,
            _ => return,
        };
        self.selected_status = status;
        let pos = self
            .visible_column(status)
            .iter()
            .position(|t| t.id == id);
        if let Some(pos) = pos {
            self.selected_task = pos;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.request_quit();
            return;
        }
        self.message = None;
        match std::mem::replace(&mut self.overlay, Overlay::None) {
            Overlay::None => match self.view {
                View::Board => self.handle_board_key(key),
                View::Archive => self.handle_archive_key(key),
            },
            Overlay::Search => self.handle_search_key(key),
            Overlay::Form(form) => self.handle_form_key(form, key),
            Overlay::ConfirmDelete { id, title } => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.run(Action::Delete(id));
                } else {
                    self.notify(MessageLevel::Info, format!("Kept '{title}'"));
                }
            }
            Overlay::Diagnostics(report) => match key.code {
                KeyCode::Char('b') => {
                    self.rebuild();
                    self.open_diagnostics();
                }
                KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q') => {}
                _ => self.overlay = Overlay::Diagnostics(report),
            },
        }
        if key.code != KeyCode::Char('q') {
            self.quit_requested = false;
        }
    }

    fn request_quit(&mut self) {
        if self.unsaved && !self.quit_requested {
            self.quit_requested = true;
            self.notify(
                MessageLevel::Warning,
                "Unsaved changes: press r to retry saving, or q again to quit",
            );
        } else {
            self.should_quit = true;
        }
    }

    fn open_edit(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if let Ok(task) = self.board.get(id) {
                self.overlay = Overlay::Form(TaskForm::edit(task));
            }
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if let Ok(task) = self.board.get(id) {
                self.overlay = Overlay::ConfirmDelete {
                    id,
                    title: task.title.clone(),
                };
            }
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.request_quit(),
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(status) = self.selected_status.prev() {
                    self.selected_status = status;
                }
                self.clamp_selection();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(status) = self.selected_status.next() {
                    self.selected_status = status;
                }
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_task = self.selected_task.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.visible_column(self.selected_status).len();
                if self.selected_task + 1 < len {
                    self.selected_task += 1;
                }
            }
            KeyCode::Char('<') | KeyCode::Char('H') => self.move_selected(Direction::Left),
            KeyCode::Char('>') | KeyCode::Char('L') => self.move_selected(Direction::Right),
            KeyCode::Char(c @ '1'..='3') => {
                let status = Status::ALL[c as usize - '1' as usize];
                if let Some(id) = self.selected_task_id() {
                    self.run(Action::MoveTo(id, status));
                    self.follow(id);
                }
            }
            KeyCode::Char('n') => {
                self.overlay = Overlay::Form(TaskForm::create(self.selected_status));
            }
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('a') => {
                if let Some(id) = self.selected_task_id() {
                    self.run(Action::Archive(id));
                }
            }
            KeyCode::Char('A') => self.run(Action::ArchiveDone),
            KeyCode::Char('d') => self.confirm_delete(),
            KeyCode::Char('/') => self.overlay = Overlay::Search,
            KeyCode::Esc => {
                self.query.clear();
                self.clamp_selection();
            }
            KeyCode::Char('s') => {
                self.order = self.order.toggle();
                self.notify(
                    MessageLevel::Info,
                    format!("Sorted by {}", self.order.label()),
                );
            }
            KeyCode::Char('v') => self.view = View::Archive,
            KeyCode::Char('i') => self.open_diagnostics(),
            KeyCode::Char('r') => self.retry_save(),
            _ => {}
        }
    }

    fn move_selected(&mut self, direction: Direction) {
        if let Some(id) = self.selected_task_id() {
            self.run(Action::Move(id, direction));
            self.follow(id);
        }
    }

    fn handle_archive_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.request_quit(),
            KeyCode::Char('v') | KeyCode::Esc => {
                self.view = View::Board;
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.archive_selected = self.archive_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.archive_selected + 1 < self.visible_archive().len() {
                    self.archive_selected += 1;
                }
            }
            KeyCode::Char('u') => {
                if let Some(id) = self.selected_task_id() {
                    self.run(Action::Unarchive(id));
                }
            }
            KeyCode::Char('U') => self.run(Action::RestoreArchived),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('d') => self.confirm_delete(),
            KeyCode::Char('i') => self.open_diagnostics(),
            KeyCode::Char('r') => self.retry_save(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {}
            KeyCode::Esc => self.query.clear(),
            KeyCode::Backspace => {
                self.query.pop();
                self.overlay = Overlay::Search;
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.overlay = Overlay::Search;
            }
            _ => self.overlay = Overlay::Search,
        }
        self.selected_task = 0;
        self.archive_selected = 0;
    }

    fn handle_form_key(&mut self, mut form: TaskForm, key: KeyEvent) {
        match form.handle_key(key) {
            FormOutcome::Continue => self.overlay = Overlay::Form(form),
            FormOutcome::Cancel => {}
            FormOutcome::Submit => {
                let result = form.to_fields().and_then(|fields| {
                    let action = match form.editing {
                        Some(id) => Action::Update(id, TaskPatch::from(fields)),
                        None => Action::Create(fields),
                    };
                    self.dispatch(action)
                });
                match result {
                    Ok(()) => {
                        if let Some(id) = form.editing {
                            self.follow(id);
                        }
                    }
                    Err(e @ BoardError::Validation { .. }) => {
                        warn!(error = %e, "form rejected");
                        form.error = Some(e.to_string());
                        self.overlay = Overlay::Form(form);
                    }
                    Err(e) => {
                        self.report(&e);
                        if e.is_storage() {
                            self.overlay = Overlay::Form(form);
                        }
                    }
                }
            }
        }
    }
}
