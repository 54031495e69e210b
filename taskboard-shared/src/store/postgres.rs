/// PostgreSQL store adapter.
///
/// Queries are runtime-checked (`sqlx::query_as` with binds) so the crate
/// builds without a live database. Constraint failures are mapped from the
/// PostgreSQL SQLSTATE codes `23505` (unique) and `23503` (foreign key).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{
    CommentStore, ProjectStore, Store, StoreError, StoreResult, TaskStore, UserStore,
};
use crate::models::comment::{Comment, CommentView};
use crate::models::membership::{MemberView, Membership, ProjectRole};
use crate::models::project::Project;
use crate::models::task::{Task, TaskSummary};
use crate::models::user::User;

macro_rules! user_columns {
    () => {
        "id, username, email, password_hash, first_name, last_name, role, is_active, \
         created_at, updated_at"
    };
}

macro_rules! project_columns {
    () => {
        "id, name, description, created_by, created_at, updated_at"
    };
}

macro_rules! membership_columns {
    () => {
        "project_id, user_id, role, created_at"
    };
}

macro_rules! task_columns {
    () => {
        "id, title, description, status, priority, project_id, assigned_to, created_by, \
         due_date, created_at, updated_at"
    };
}

macro_rules! task_columns_t {
    () => {
        "t.id, t.title, t.description, t.status, t.priority, t.project_id, t.assigned_to, \
         t.created_by, t.due_date, t.created_at, t.updated_at"
    };
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default();
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::unique(constraint),
                Some("23503") => return StoreError::foreign_key(constraint),
                _ => {}
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                               role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_user(&self, user: &User) -> StoreResult<Option<User>> {
        let updated = sqlx::query_as::<_, User>(concat!(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, first_name = $5,
                last_name = $6, role = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            RETURNING "#,
            user_columns!()
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn write_project<'e>(executor: impl PgExecutor<'e>, project: &Project) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO projects (id, name, description, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(project.id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.created_by)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn write_membership<'e>(
    executor: impl PgExecutor<'e>,
    membership: &Membership,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO project_members (project_id, user_id, role, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(membership.project_id)
    .bind(membership.user_id)
    .bind(membership.role)
    .bind(membership.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn insert_project(&self, project: &Project) -> StoreResult<()> {
        write_project(&self.pool, project).await
    }

    async fn insert_project_with_manager(
        &self,
        project: &Project,
        manager: &Membership,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        write_project(&mut *tx, project).await?;
        write_membership(&mut *tx, manager).await?;
        tx.commit().await?;

        debug!(project_id = %project.id, manager = %manager.user_id, "Project stored with manager");
        Ok(())
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(concat!(
            "SELECT ",
            project_columns!(),
            " FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn insert_membership(&self, membership: &Membership) -> StoreResult<()> {
        write_membership(&self.pool, membership).await
    }

    async fn find_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(concat!(
            "SELECT ",
            membership_columns!(),
            " FROM project_members WHERE project_id = $1 AND user_id = $2"
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn list_members(&self, project_id: Uuid) -> StoreResult<Vec<MemberView>> {
        let members = sqlx::query_as::<_, MemberView>(
            r#"
            SELECT m.project_id, m.user_id, m.role, m.created_at, u.username
            FROM project_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn update_membership_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> StoreResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(concat!(
            "UPDATE project_members SET role = $3 WHERE project_id = $1 AND user_id = $2 \
             RETURNING ",
            membership_columns!()
        ))
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn delete_membership(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let unassigned = sqlx::query(
            r#"
            UPDATE tasks SET assigned_to = NULL, updated_at = NOW()
            WHERE project_id = $1 AND assigned_to = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        debug!(%project_id, %user_id, unassigned, "Membership removed");
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(concat!(
            "INSERT INTO tasks (",
            task_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.project_id)
        .bind(task.assigned_to)
        .bind(task.created_by)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(concat!(
            "SELECT ",
            task_columns!(),
            " FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(
        &self,
        task: &Task,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>> {
        let updated = sqlx::query_as::<_, Task>(concat!(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, priority = $5,
                assigned_to = $6, due_date = $7, updated_at = $8
            WHERE id = $1 AND ($9::timestamptz IS NULL OR updated_at = $9)
            RETURNING "#,
            task_columns!()
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.assigned_to)
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn list_project_tasks(&self, project_id: Uuid) -> StoreResult<Vec<TaskSummary>> {
        let tasks = sqlx::query_as::<_, TaskSummary>(concat!(
            "SELECT ",
            task_columns_t!(),
            r#", u.username AS assigned_username
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.project_id = $1
            ORDER BY t.created_at ASC"#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn list_assigned_tasks(&self, user_id: Uuid) -> StoreResult<Vec<TaskSummary>> {
        let tasks = sqlx::query_as::<_, TaskSummary>(concat!(
            "SELECT ",
            task_columns_t!(),
            r#", u.username AS assigned_username
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.assigned_to = $1
            ORDER BY t.created_at ASC"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, task_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.task_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, task_id, user_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_task_comments(&self, task_id: Uuid) -> StoreResult<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.task_id, c.user_id, c.content, c.created_at, u.username
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
