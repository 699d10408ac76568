use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{BoardError, Result};

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl Status {
    /// Column order, left to right
    pub const ALL: [Status; 3] = [Status::ToDo, Status::InProgress, Status::Done];

    pub fn label(self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Status::ToDo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    /// Column to the right, if any
    pub fn next(self) -> Option<Status> {
        Status::ALL.get(self.index() + 1).copied()
    }

    /// Column to the left, if any
    pub fn prev(self) -> Option<Status> {
        self.index().checked_sub(1).map(|i| Status::ALL[i])
    }

    /// Cycle used by the form selector, wrapping at both ends
    pub fn cycle(self, forward: bool) -> Status {
        let len = Status::ALL.len();
        let i = if forward {
            (self.index() + 1) % len
        } else {
            (self.index() + len - 1) % len
        };
        Status::ALL[i]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    pub fn cycle(self, forward: bool) -> Priority {
        let len = Priority::ALL.len();
        let i = if forward {
            (self.index() + 1) % len
        } else {
            (self.index() + len - 1) % len
        };
        Priority::ALL[i]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How close a task is to its due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    /// Due today or within the next two days
    DueSoon,
    Normal,
}

/// Days ahead of today that still count as due soon
const DUE_SOON_DAYS: i64 = 2;

impl DueStatus {
    pub fn of(due_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match due_date {
            Some(due) if due < today => DueStatus::Overdue,
            Some(due) if (due - today).num_days() <= DUE_SOON_DAYS => DueStatus::DueSoon,
            _ => DueStatus::Normal,
        }
    }
}

/// A single row of the board. Field order is the CSV column order.
///
/// `description` and `assignee` are private so that an empty string can
/// never be stored: an empty cell always means "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    description: Option<String>,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    assignee: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub archived: bool,
}

impl Task {
    /// Build a new task with a fresh id, validating the fields first.
    pub fn new(fields: TaskFields) -> Result<Self> {
        let fields = fields.validated()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            due_date: fields.due_date,
            priority: fields.priority,
            assignee: fields.assignee,
            archived: false,
        })
    }

    /// Apply a patch. Validation happens before any field is touched.
    pub fn apply(&mut self, patch: TaskPatch) -> Result<()> {
        let patch = patch.validated()?;
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    /// Editable fields, as used to pre-fill the edit form
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            due_date: self.due_date,
            priority: self.priority,
            assignee: self.assignee.clone(),
        }
    }

    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        DueStatus::of(self.due_date, today)
    }
}

/// User-supplied fields for creating or editing a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub assignee: Option<String>,
}

impl TaskFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    fn validated(self) -> Result<Self> {
        Ok(Self {
            title: required_title(self.title)?,
            description: optional_text(self.description),
            assignee: optional_text(self.assignee),
            ..self
        })
    }
}

/// Partial update. `None` leaves a field untouched; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<Status>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub assignee: Option<Option<String>>,
    pub archived: Option<bool>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    fn validated(self) -> Result<Self> {
        Ok(Self {
            title: self.title.map(required_title).transpose()?,
            description: self.description.map(optional_text),
            assignee: self.assignee.map(optional_text),
            ..self
        })
    }
}

impl From<TaskFields> for TaskPatch {
    fn from(fields: TaskFields) -> Self {
        Self {
            title: Some(fields.title),
            description: Some(fields.description),
            status: Some(fields.status),
            due_date: Some(fields.due_date),
            priority: Some(fields.priority),
            assignee: Some(fields.assignee),
            archived: None,
        }
    }
}

/// Parse a due date typed as `YYYY-MM-DD`. Blank input means no due date.
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| BoardError::validation("due date", format!("'{input}' is not YYYY-MM-DD")))
}

fn required_title(title: String) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BoardError::validation("title", "must not be empty"));
    }
    Ok(title.to_string())
}

fn optional_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Empty cells, and the `nan` written for blanks by older versions of the
/// board, read as absent.
fn deserialize_optional_text<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|t| !t.is_empty() && t != "nan"))
}

/// Accepts `true`/`false` in any case, `1`/`0`, and an empty cell as false.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid archived flag '{other}'"
        ))),
    }
}
