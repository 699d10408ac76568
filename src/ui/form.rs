//! Create/edit form state

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use uuid::Uuid;

use crate::error::Result;
use crate::task::{parse_due_date, Priority, Status, Task, TaskFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Status,
    Priority,
    DueDate,
    Assignee,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::Priority,
        FormField::DueDate,
        FormField::Assignee,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Status => "Status",
            FormField::Priority => "Priority",
            FormField::DueDate => "Due (YYYY-MM-DD)",
            FormField::Assignee => "Assignee",
        }
    }

    fn position(self) -> usize {
        FormField::ALL
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default()
    }

    fn next(self) -> Self {
        FormField::ALL[(self.position() + 1) % FormField::ALL.len()]
    }

    fn prev(self) -> Self {
        let len = FormField::ALL.len();
        FormField::ALL[(self.position() + len - 1) % len]
    }
}

/// What the caller should do after the form handled a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Task being edited, `None` when creating
    pub editing: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: String,
    pub assignee: String,
    pub focus: FormField,
    /// Validation message from the last submit
    pub error: Option<String>,
}

impl TaskForm {
    /// Empty form for a new task, starting in `status`
    pub fn create(status: Status) -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            status,
            priority: Priority::default(),
            due_date: String::new(),
            assignee: String::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    /// Form pre-filled with the current values of `task`
    pub fn edit(task: &Task) -> Self {
        Self {
            editing: Some(task.id),
            title: task.title.clone(),
            description: task.description().unwrap_or_default().to_string(),
            status: task.status,
            priority: task.priority,
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            assignee: task.assignee().unwrap_or_default().to_string(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Task"
        } else {
            "New Task"
        }
    }

    /// Text shown for a field
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Status => self.status.label(),
            FormField::Priority => self.priority.label(),
            FormField::DueDate => &self.due_date,
            FormField::Assignee => &self.assignee,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Assignee => Some(&mut self.assignee),
            FormField::Status | FormField::Priority => None,
        }
    }

    fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Status => self.status = self.status.cycle(forward),
            FormField::Priority => self.priority = self.priority.cycle(forward),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Left => self.cycle(false),
            KeyCode::Right => self.cycle(true),
            KeyCode::Backspace => {
                if let Some(text) = self.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.text_mut() {
                    Some(text) => text.push(c),
                    None => self.cycle(c != '-'),
                }
            }
            _ => {}
        }
        FormOutcome::Continue
    }

    /// Collect the typed values. Title checks happen when the task is built.
    pub fn to_fields(&self) -> Result<TaskFields> {
        Ok(TaskFields {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            status: self.status,
            due_date: parse_due_date(&self.due_date)?,
            priority: self.priority,
            assignee: Some(self.assignee.clone()),
        })
    }
}
