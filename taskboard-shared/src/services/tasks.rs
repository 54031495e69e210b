/// Task lifecycle: creation, field updates, listing order and deletion.
///
/// # Who may do what
///
/// | Operation | Allowed |
/// |---|---|
/// | create | project members, admins |
/// | update | creator, assignee, project managers, admins |
/// | delete | creator, project managers, admins |
///
/// Status moves freely between any two values. An assignee must be a member
/// of the task's project, on create and on every update that sets one.
///
/// Concurrent updates are last-write-wins unless the caller sends
/// `expected_updated_at`, in which case a stale copy fails with
/// [`CoreError::StaleWrite`].

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::authorization::{is_project_manager, require_owner_or_admin, require_project_member};
use crate::auth::middleware::AuthContext;
use crate::error::{CoreError, CoreResult};
use crate::models;
use crate::models::task::{NewTask, Task, TaskPatch, TaskStatus, TaskSummary};
use crate::services::{check_length, MAX_TITLE_LEN};
use crate::store::Store;

/// Task operations over a [`Store`]
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

/// Sorts by priority descending, then creation time ascending
///
/// The sort is stable, so equal keys keep the order they were given in.
pub fn sort_for_board(tasks: &mut [TaskSummary]) {
    tasks.sort_by_key(|s| (Reverse(s.task.priority), s.task.created_at));
}

fn validate_title(title: &str) -> CoreResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::validation("Title is required"));
    }
    check_length("Title", title, MAX_TITLE_LEN)?;
    Ok(title.to_string())
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn task(&self, id: Uuid) -> CoreResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Task", id))
    }

    async fn ensure_assignable(&self, project_id: Uuid, assignee: Uuid) -> CoreResult<()> {
        if self.store.find_membership(project_id, assignee).await?.is_none() {
            warn!(%project_id, %assignee, "Assignee is not a project member");
            return Err(CoreError::InvalidAssignee(assignee));
        }
        Ok(())
    }

    async fn manages_project(&self, actor: &AuthContext, project_id: Uuid) -> CoreResult<bool> {
        if actor.is_admin() {
            return Ok(true);
        }
        let membership = self.store.find_membership(project_id, actor.user_id).await?;
        Ok(is_project_manager(actor, membership.as_ref()))
    }

    /// Creates a task in `pending` with `medium` priority unless given
    pub async fn create(&self, actor: &AuthContext, input: NewTask) -> CoreResult<Task> {
        let title = validate_title(input.title.as_deref().unwrap_or_default())?;
        let project_id = input
            .project_id
            .ok_or_else(|| CoreError::validation("project_id is required"))?;

        if self.store.find_project(project_id).await?.is_none() {
            return Err(CoreError::not_found("Project", project_id));
        }
        require_project_member(self.store.as_ref(), actor, project_id).await?;

        if let Some(assignee) = input.assigned_to {
            self.ensure_assignable(project_id, assignee).await?;
        }

        let now = models::now();
        let task = Task {
            id: Uuid::new_v4(),
            title,
            description: input.description,
            status: TaskStatus::Pending,
            priority: input.priority.unwrap_or_default(),
            project_id,
            assigned_to: input.assigned_to,
            created_by: actor.user_id,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_task(&task).await?;

        info!(task_id = %task.id, %project_id, actor = %actor.user_id, "Task created");
        Ok(task)
    }

    /// Applies a partial update and refreshes `updated_at`
    pub async fn update_fields(
        &self,
        actor: &AuthContext,
        id: Uuid,
        patch: TaskPatch,
    ) -> CoreResult<Task> {
        let mut task = self.task(id).await?;

        let involved = task.created_by == actor.user_id || task.assigned_to == Some(actor.user_id);
        if !involved && !self.manages_project(actor, task.project_id).await? {
            warn!(task_id = %id, actor = %actor.user_id, "Task update denied");
            return Err(CoreError::forbidden(
                "Only the creator, the assignee or a project manager may update this task",
            ));
        }

        if let Some(expected) = patch.expected_updated_at {
            if expected != task.updated_at {
                return Err(CoreError::StaleWrite);
            }
        }
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(assignee) = patch.new_assignee() {
            self.ensure_assignable(task.project_id, assignee).await?;
        }

        task.apply(&patch);
        task.updated_at = models::now();

        let updated = match self.store.update_task(&task, patch.expected_updated_at).await? {
            Some(updated) => updated,
            None if self.store.find_task(id).await?.is_some() => return Err(CoreError::StaleWrite),
            None => return Err(CoreError::not_found("Task", id)),
        };

        info!(task_id = %id, actor = %actor.user_id, status = updated.status.as_str(), "Task updated");
        Ok(updated)
    }

    /// Tasks of a project in board order, with assignee names
    pub async fn list_for_project(&self, project_id: Uuid) -> CoreResult<Vec<TaskSummary>> {
        let mut tasks = self.store.list_project_tasks(project_id).await?;
        sort_for_board(&mut tasks);

        debug!(%project_id, count = tasks.len(), "Listed project tasks");
        Ok(tasks)
    }

    /// Tasks assigned to a user across projects; self or admin
    pub async fn list_for_user(
        &self,
        actor: &AuthContext,
        user_id: Uuid,
    ) -> CoreResult<Vec<TaskSummary>> {
        require_owner_or_admin(actor, user_id)?;

        let tasks = self.store.list_assigned_tasks(user_id).await?;
        debug!(%user_id, count = tasks.len(), "Listed assigned tasks");
        Ok(tasks)
    }

    /// Deletes a task and its comments; creator, project manager or admin
    pub async fn delete(&self, actor: &AuthContext, id: Uuid) -> CoreResult<()> {
        let task = self.task(id).await?;

        if task.created_by != actor.user_id && !self.manages_project(actor, task.project_id).await? {
            warn!(task_id = %id, actor = %actor.user_id, "Task delete denied");
            return Err(CoreError::forbidden(
                "Only the creator or a project manager may delete this task",
            ));
        }

        if !self.store.delete_task(id).await? {
            return Err(CoreError::not_found("Task", id));
        }

        info!(task_id = %id, actor = %actor.user_id, "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;
    use chrono::{Duration, Utc};

    fn summary(priority: TaskPriority, offset_ms: i64) -> TaskSummary {
        let created = Utc::now() + Duration::milliseconds(offset_ms);
        TaskSummary {
            task: Task {
                id: Uuid::new_v4(),
                title: format!("{priority:?}"),
                description: None,
                status: TaskStatus::Pending,
                priority,
                project_id: Uuid::nil(),
                assigned_to: None,
                created_by: Uuid::nil(),
                due_date: None,
                created_at: created,
                updated_at: created,
            },
            assigned_username: None,
        }
    }

    #[test]
    fn test_sort_for_board() {
        let mut tasks = vec![
            summary(TaskPriority::Low, 0),
            summary(TaskPriority::Urgent, 1),
            summary(TaskPriority::Medium, 2),
            summary(TaskPriority::Urgent, 3),
            summary(TaskPriority::High, 4),
        ];
        let first_urgent = tasks[1].task.id;
        let second_urgent = tasks[3].task.id;

        sort_for_board(&mut tasks);

        let priorities: Vec<_> = tasks.iter().map(|s| s.task.priority).collect();
        assert_eq!(
            priorities,
            vec![
                TaskPriority::Urgent,
                TaskPriority::Urgent,
                TaskPriority::High,
                TaskPriority::Medium,
                TaskPriority::Low
            ]
        );
        assert_eq!(tasks[0].task.id, first_urgent);
        assert_eq!(tasks[1].task.id, second_urgent);
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(matches!(validate_title("   "), Err(CoreError::Validation(_))));
        assert_eq!(validate_title("  Ship it ").unwrap(), "Ship it");
        assert!(matches!(validate_title(&"x".repeat(256)), Err(CoreError::Validation(_))));
        assert!(validate_title(&"x".repeat(255)).is_ok());
    }
}
