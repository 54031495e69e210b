/// Comment endpoints
///
/// - `GET /comments/task/:task_id` - Thread of a task, oldest first
/// - `POST /comments` - Add a comment as the caller, wrapped as `{ "comment": { ... } }`
/// - `DELETE /comments/:id` - Delete a comment (author or admin)

use crate::{
    app::AppState,
    error::{ApiJson, ApiPath, ApiResult},
    routes::MessageResponse,
};
use axum::extract::State;
use serde::Serialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::comment::{Comment, CommentView, NewComment},
};
use uuid::Uuid;

/// Single comment reply
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

pub async fn task_comments(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<Vec<CommentView>>> {
    let thread = state.services.comments.list_for_task(task_id).await?;
    Ok(ApiJson(thread))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<NewComment>,
) -> ApiResult<ApiJson<CommentResponse>> {
    let comment = state.services.comments.create(&auth, input).await?;
    Ok(ApiJson(CommentResponse { comment }))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<MessageResponse>> {
    state.services.comments.delete(&auth, id).await?;
    Ok(ApiJson(MessageResponse::new("Comment deleted")))
}
