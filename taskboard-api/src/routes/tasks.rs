/// Task endpoints
///
/// - `GET /tasks` - Tasks assigned to the caller
/// - `GET /tasks/user/:user_id` - Tasks assigned to a user (self or admin)
/// - `GET /tasks/project/:project_id` - Project tasks, highest priority first
/// - `POST /tasks` - Create a task in a project the caller belongs to
/// - `PUT /tasks/:id` - Partial update; `expected_updated_at` guards against stale writes
/// - `DELETE /tasks/:id` - Delete a task and its comments
///
/// Created and updated tasks are wrapped as `{ "task": { ... } }`.

use crate::{
    app::AppState,
    error::{ApiJson, ApiPath, ApiResult},
    routes::MessageResponse,
};
use axum::extract::State;
use serde::Serialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, TaskPatch, TaskSummary},
};
use uuid::Uuid;

/// Single task reply
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

pub async fn my_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiJson<Vec<TaskSummary>>> {
    let tasks = state.services.tasks.list_for_user(&auth, auth.user_id).await?;
    Ok(ApiJson(tasks))
}

pub async fn user_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<Vec<TaskSummary>>> {
    let tasks = state.services.tasks.list_for_user(&auth, user_id).await?;
    Ok(ApiJson(tasks))
}

/// Any authenticated caller may read a project's board
pub async fn project_tasks(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<Vec<TaskSummary>>> {
    let tasks = state.services.tasks.list_for_project(project_id).await?;
    Ok(ApiJson(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<NewTask>,
) -> ApiResult<ApiJson<TaskResponse>> {
    let task = state.services.tasks.create(&auth, input).await?;
    Ok(ApiJson(TaskResponse { task }))
}

pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> ApiResult<ApiJson<TaskResponse>> {
    let task = state.services.tasks.update_fields(&auth, id, patch).await?;
    Ok(ApiJson(TaskResponse { task }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<MessageResponse>> {
    state.services.tasks.delete(&auth, id).await?;
    Ok(ApiJson(MessageResponse::new("Task deleted")))
}
