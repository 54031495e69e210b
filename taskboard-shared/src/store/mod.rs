/// Persistence port for users, projects, memberships, tasks and comments.
///
/// The services talk to the backing store only through [`Store`]. Two
/// adapters implement it:
///
/// - [`postgres::PgStore`]: PostgreSQL via `sqlx`
/// - [`memory::InMemoryStore`]: process-local, used by tests and embedding
///
/// Both report constraint failures as [`StoreError`] with the PostgreSQL
/// constraint name, so callers can tell *which* uniqueness rule fired.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::comment::{Comment, CommentView};
use crate::models::membership::{MemberView, Membership, ProjectRole};
use crate::models::project::Project;
use crate::models::task::{Task, TaskSummary};
use crate::models::user::User;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique or primary-key constraint rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign-key constraint rejected the write or delete.
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn unique(constraint: &str) -> Self {
        Self::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }

    pub(crate) fn foreign_key(constraint: &str) -> Self {
        Self::ForeignKeyViolation {
            constraint: constraint.to_string(),
        }
    }
}

/// User persistence contract.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// [`StoreError::UniqueViolation`] with `users_username_key` or
    /// `users_email_key` when either is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks a user up by (already lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// All users ordered by username.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Replaces the stored row. Returns `None` when the user is absent.
    async fn update_user(&self, user: &User) -> StoreResult<Option<User>>;

    /// Deletes a user. Returns `false` when absent.
    ///
    /// # Errors
    ///
    /// [`StoreError::ForeignKeyViolation`] while tasks they created or
    /// comments they wrote still exist.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

/// Project and membership persistence contract.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert_project(&self, project: &Project) -> StoreResult<()>;

    /// Stores a project together with its first manager membership.
    /// Either both rows are written or neither is.
    async fn insert_project_with_manager(
        &self,
        project: &Project,
        manager: &Membership,
    ) -> StoreResult<()>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Stores a membership.
    ///
    /// # Errors
    ///
    /// [`StoreError::UniqueViolation`] (`project_members_pkey`) when the
    /// user is already a member, [`StoreError::ForeignKeyViolation`] when
    /// the user or project is absent.
    async fn insert_membership(&self, membership: &Membership) -> StoreResult<()>;

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>>;

    /// Members of a project with usernames, in join order.
    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<MemberView>>;

    async fn update_membership_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> StoreResult<Option<Membership>>;

    /// Removes a membership and unassigns the user's tasks in the project,
    /// atomically. Returns `false` when there was no membership.
    async fn delete_membership(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &Task) -> StoreResult<()>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Replaces the stored row.
    ///
    /// With `expected_updated_at` set, the write only happens if the stored
    /// `updated_at` still equals it. Returns `None` when the task is absent
    /// or the guard did not match.
    async fn update_task(
        &self,
        task: &Task,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>>;

    /// Tasks of a project with assignee usernames, oldest first.
    async fn list_project_tasks(&self, project_id: Uuid) -> StoreResult<Vec<TaskSummary>>;

    /// Tasks assigned to a user across projects, oldest first.
    async fn list_assigned_tasks(&self, user_id: Uuid) -> StoreResult<Vec<TaskSummary>>;

    /// Deletes a task and its comments atomically. Returns `false` when absent.
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}

/// Comment persistence contract.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    /// Comments of a task with author usernames, oldest first.
    async fn list_task_comments(&self, task_id: Uuid) -> StoreResult<Vec<CommentView>>;

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;
}

/// The complete store used by the services.
#[async_trait]
pub trait Store: UserStore + ProjectStore + TaskStore + CommentStore {
    /// Checks the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
