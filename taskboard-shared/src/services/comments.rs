/// Comment threads on tasks.
///
/// Threads are append-only and read oldest first. A comment is removed only
/// by its author or an admin, or together with its task.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::require_owner_or_admin;
use crate::auth::middleware::AuthContext;
use crate::error::{CoreError, CoreResult};
use crate::models;
use crate::models::comment::{Comment, CommentView, NewComment};
use crate::store::{Store, StoreError};

/// Comment operations over a [`Store`]
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Comments of a task, oldest first, with author names
    pub async fn list_for_task(&self, task_id: Uuid) -> CoreResult<Vec<CommentView>> {
        if self.store.find_task(task_id).await?.is_none() {
            return Err(CoreError::not_found("Task", task_id));
        }

        let comments = self.store.list_task_comments(task_id).await?;
        debug!(%task_id, count = comments.len(), "Listed comments");
        Ok(comments)
    }

    /// Posts a comment as the caller
    pub async fn create(&self, actor: &AuthContext, input: NewComment) -> CoreResult<Comment> {
        let task_id = input
            .task_id
            .ok_or_else(|| CoreError::validation("task_id is required"))?;
        let content = input.content.as_deref().map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(CoreError::validation("Content is required"));
        }

        if self.store.find_task(task_id).await?.is_none() {
            return Err(CoreError::not_found("Task", task_id));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            task_id,
            user_id: actor.user_id,
            content: content.to_string(),
            created_at: models::now(),
        };

        self.store
            .insert_comment(&comment)
            .await
            .map_err(|err| match err {
                // task deleted between the lookup and the insert
                StoreError::ForeignKeyViolation { constraint } if constraint.contains("task") => {
                    CoreError::not_found("Task", task_id)
                }
                other => other.into(),
            })?;

        info!(comment_id = %comment.id, %task_id, actor = %actor.user_id, "Comment created");
        Ok(comment)
    }

    /// Deletes a comment; author or admin
    pub async fn delete(&self, actor: &AuthContext, id: Uuid) -> CoreResult<()> {
        let comment = self
            .store
            .find_comment(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Comment", id))?;

        require_owner_or_admin(actor, comment.user_id)?;

        if !self.store.delete_comment(id).await? {
            return Err(CoreError::not_found("Comment", id));
        }

        info!(comment_id = %id, actor = %actor.user_id, "Comment deleted");
        Ok(())
    }
}
