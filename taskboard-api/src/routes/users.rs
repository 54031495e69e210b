/// Account administration endpoints
///
/// - `GET /users` - All accounts, ordered by username (admin)
/// - `GET /users/:id` - One account (self or admin)
/// - `PUT /users/:id` - Update profile (self or admin; role and activation admin only)
/// - `DELETE /users/:id` - Delete account (admin)

use crate::{
    app::AppState,
    error::{ApiJson, ApiPath, ApiResult},
    routes::MessageResponse,
};
use axum::extract::State;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::user::{ProfileUpdate, PublicUser},
};
use uuid::Uuid;

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiJson<Vec<PublicUser>>> {
    let users = state.services.accounts.list_accounts(&auth).await?;
    Ok(ApiJson(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<PublicUser>> {
    let user = state.services.accounts.get_account(&auth, id).await?;
    Ok(ApiJson(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<ApiJson<PublicUser>> {
    let user = state.services.accounts.update_profile(&auth, id, update).await?;
    Ok(ApiJson(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<MessageResponse>> {
    state.services.accounts.delete_account(&auth, id).await?;
    Ok(ApiJson(MessageResponse::new("User deleted")))
}
