/// In-memory store for tests and embedding.
///
/// Enforces the same unique and foreign-key rules as the PostgreSQL schema
/// and reports them with the same constraint names. Rows live in insertion
/// order, so listings break `created_at` ties the way they were written.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    CommentStore, ProjectStore, Store, StoreError, StoreResult, TaskStore, UserStore,
};
use crate::models::comment::{Comment, CommentView};
use crate::models::membership::{MemberView, Membership, ProjectRole};
use crate::models::project::Project;
use crate::models::task::{Task, TaskSummary};
use crate::models::user::User;

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    memberships: Vec<Membership>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
}

impl State {
    fn username(&self, id: Uuid) -> Option<String> {
        self.users.get(&id).map(|u| u.username.clone())
    }

    fn summarize(&self, task: &Task) -> TaskSummary {
        TaskSummary {
            task: task.clone(),
            assigned_username: task.assigned_to.and_then(|id| self.username(id)),
        }
    }

    fn check_project(&self, project: &Project) -> StoreResult<()> {
        if self.projects.contains_key(&project.id) {
            return Err(StoreError::unique("projects_pkey"));
        }
        if let Some(creator) = project.created_by {
            if !self.users.contains_key(&creator) {
                return Err(StoreError::foreign_key("projects_created_by_fkey"));
            }
        }
        Ok(())
    }

    fn check_task_refs(&self, task: &Task) -> StoreResult<()> {
        if !self.projects.contains_key(&task.project_id) {
            return Err(StoreError::foreign_key("tasks_project_id_fkey"));
        }
        if !self.users.contains_key(&task.created_by) {
            return Err(StoreError::foreign_key("tasks_created_by_fkey"));
        }
        if let Some(assignee) = task.assigned_to {
            if !self.users.contains_key(&assignee) {
                return Err(StoreError::foreign_key("tasks_assigned_to_fkey"));
            }
        }
        Ok(())
    }

    fn check_user_unique(&self, user: &User) -> StoreResult<()> {
        // email first, matching the index order of the schema
        let mut others = self.users.values().filter(|u| u.id != user.id);
        if others.clone().any(|u| u.email == user.email) {
            return Err(StoreError::unique("users_email_key"));
        }
        if others.any(|u| u.username == user.username) {
            return Err(StoreError::unique("users_username_key"));
        }
        Ok(())
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|err| StoreError::Backend(err.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id) {
            return Err(StoreError::unique("users_pkey"));
        }
        state.check_user_unique(user)?;
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> StoreResult<Option<User>> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user.id) {
            return Ok(None);
        }
        state.check_user_unique(user)?;
        state.users.insert(user.id, user.clone());
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        if !state.users.contains_key(&id) {
            return Ok(false);
        }
        if state.tasks.iter().any(|t| t.created_by == id) {
            return Err(StoreError::foreign_key("tasks_created_by_fkey"));
        }
        if state.comments.iter().any(|c| c.user_id == id) {
            return Err(StoreError::foreign_key("comments_user_id_fkey"));
        }

        state.users.remove(&id);
        state.memberships.retain(|m| m.user_id != id);
        for task in state.tasks.iter_mut().filter(|t| t.assigned_to == Some(id)) {
            task.assigned_to = None;
        }
        for project in state.projects.values_mut() {
            if project.created_by == Some(id) {
                project.created_by = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        let mut state = self.write()?;
        state.check_project(project)?;
        state.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn insert_project_with_manager(
        &self,
        project: &Project,
        manager: &Membership,
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        state.check_project(project)?;
        if manager.project_id != project.id {
            return Err(StoreError::foreign_key("project_members_project_id_fkey"));
        }
        if !state.users.contains_key(&manager.user_id) {
            return Err(StoreError::foreign_key("project_members_user_id_fkey"));
        }
        state.projects.insert(project.id, project.clone());
        state.memberships.push(manager.clone());
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn insert_membership(&self, membership: &Membership) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.projects.contains_key(&membership.project_id) {
            return Err(StoreError::foreign_key("project_members_project_id_fkey"));
        }
        if !state.users.contains_key(&membership.user_id) {
            return Err(StoreError::foreign_key("project_members_user_id_fkey"));
        }
        if state
            .memberships
            .iter()
            .any(|m| m.project_id == membership.project_id && m.user_id == membership.user_id)
        {
            return Err(StoreError::unique("project_members_pkey"));
        }
        state.memberships.push(membership.clone());
        Ok(())
    }

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(self
            .read()?
            .memberships
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<MemberView>> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id)
            .filter_map(|m| {
                state.username(m.user_id).map(|username| MemberView {
                    membership: m.clone(),
                    username,
                })
            })
            .collect())
    }

    async fn update_membership_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> StoreResult<Option<Membership>> {
        let mut state = self.write()?;
        Ok(state
            .memberships
            .iter_mut()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .map(|m| {
                m.role = role;
                m.clone()
            }))
    }

    async fn delete_membership(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|m| !(m.project_id == project_id && m.user_id == user_id));
        if state.memberships.len() == before {
            return Ok(false);
        }

        let now = crate::models::now();
        for task in state
            .tasks
            .iter_mut()
            .filter(|t| t.project_id == project_id && t.assigned_to == Some(user_id))
        {
            task.assigned_to = None;
            task.updated_at = now;
        }
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::unique("tasks_pkey"));
        }
        state.check_task_refs(task)?;
        state.tasks.push(task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.read()?.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn update_task(
        &self,
        task: &Task,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;
        state.check_task_refs(task)?;

        let Some(stored) = state.tasks.iter_mut().find(|t| t.id == task.id) else {
            return Ok(None);
        };
        if let Some(expected) = expected_updated_at {
            if stored.updated_at != expected {
                return Ok(None);
            }
        }
        *stored = task.clone();
        Ok(Some(task.clone()))
    }

    async fn list_project_tasks(&self, project_id: Uuid) -> StoreResult<Vec<TaskSummary>> {
        let state = self.read()?;
        let mut tasks: Vec<TaskSummary> = state
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .map(|t| state.summarize(t))
            .collect();
        tasks.sort_by_key(|s| s.task.created_at);
        Ok(tasks)
    }

    async fn list_assigned_tasks(&self, user_id: Uuid) -> StoreResult<Vec<TaskSummary>> {
        let state = self.read()?;
        let mut tasks: Vec<TaskSummary> = state
            .tasks
            .iter()
            .filter(|t| t.assigned_to == Some(user_id))
            .map(|t| state.summarize(t))
            .collect();
        tasks.sort_by_key(|s| s.task.created_at);
        Ok(tasks)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Ok(false);
        }
        state.comments.retain(|c| c.task_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.comments.iter().any(|c| c.id == comment.id) {
            return Err(StoreError::unique("comments_pkey"));
        }
        if !state.tasks.iter().any(|t| t.id == comment.task_id) {
            return Err(StoreError::foreign_key("comments_task_id_fkey"));
        }
        if !state.users.contains_key(&comment.user_id) {
            return Err(StoreError::foreign_key("comments_user_id_fkey"));
        }
        state.comments.push(comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.read()?.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_task_comments(&self, task_id: Uuid) -> StoreResult<Vec<CommentView>> {
        let state = self.read()?;
        let mut comments: Vec<CommentView> = state
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .map(|c| CommentView {
                comment: c.clone(),
                username: state.username(c.user_id),
            })
            .collect();
        comments.sort_by_key(|v| v.comment.created_at);
        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(state.comments.len() != before)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}
