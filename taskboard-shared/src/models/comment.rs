/// Comment model
///
/// Comments are immutable once written; the only mutation is deletion.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY,
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with the author's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,

    /// Author's username
    pub username: Option<String>,
}

/// Input for posting a comment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub task_id: Option<Uuid>,

    #[serde(default)]
    pub content: Option<String>,
}
