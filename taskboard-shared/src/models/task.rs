/// Task model
///
/// # Status
///
/// Status has no restricted transition graph: an authorized actor may move a
/// task between any two statuses in one step.
///
/// ```text
/// backlog ⇄ pending ⇄ in_progress ⇄ done   (and every other pair)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('backlog', 'pending', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task status
///
/// Canonical wire names are snake_case; the board labels are accepted on
/// input as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet planned
    #[serde(alias = "Backlog")]
    Backlog,

    /// Planned, not started
    #[default]
    #[serde(alias = "Pending", alias = "To Do", alias = "To-Do", alias = "todo")]
    Pending,

    /// Being worked on
    #[serde(
        alias = "In Progress",
        alias = "In-progress",
        alias = "in-progress",
        alias = "InProgress"
    )]
    InProgress,

    /// Finished
    #[serde(alias = "Done")]
    Done,
}

impl TaskStatus {
    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority, ordered `Low < Medium < High < Urgent`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
    #[serde(alias = "Urgent")]
    Urgent,
}

impl TaskPriority {
    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title, never blank
    pub title: String,

    /// Optional long description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Priority used for listing order
    pub priority: TaskPriority,

    /// Owning project
    pub project_id: Uuid,

    /// Assignee; always a member of `project_id` when set
    pub assigned_to: Option<Uuid>,

    /// Creator
    pub created_by: Uuid,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Applies the field changes of a patch
    ///
    /// Leaves `updated_at` alone; the caller stamps it.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
    }
}

/// Task joined with the assignee's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    /// Assignee's username, if assigned
    pub assigned_username: Option<String>,
}

/// Input for creating a task
///
/// `title` and `project_id` are optional here so that a missing value is a
/// validation failure rather than a body parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub project_id: Option<Uuid>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default)]
    pub assigned_to: Option<Uuid>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Partial update of a task
///
/// Nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub assigned_to: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    /// When set, the update is rejected unless it matches the stored
    /// `updated_at`
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// New assignee, if the patch sets one
    pub fn new_assignee(&self) -> Option<Uuid> {
        self.assigned_to.flatten()
    }
}
