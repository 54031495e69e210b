/// Project and membership endpoints
///
/// - `POST /projects` - Create a project; the caller becomes its manager
/// - `GET /projects/:id/members` - Members with usernames
/// - `POST /projects/:id/members` - Add a member
/// - `PUT /projects/:id/members/:user_id` - Change a member's project role (admin)
/// - `DELETE /projects/:id/members/:user_id` - Remove a member and unassign their tasks

use crate::{
    app::AppState,
    error::{ApiJson, ApiPath, ApiResult},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{
        membership::{MemberView, Membership, NewMember, ProjectRole},
        project::{NewProject, Project},
    },
};
use uuid::Uuid;

/// Member role change request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRole {
    pub role: ProjectRole,
}

pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<NewProject>,
) -> ApiResult<(StatusCode, ApiJson<Project>)> {
    let project = state.services.projects.create_project(&auth, input).await?;
    Ok((StatusCode::CREATED, ApiJson(project)))
}

pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<ApiJson<Vec<MemberView>>> {
    let members = state.services.projects.list_members(&auth, project_id).await?;
    Ok(ApiJson(members))
}

pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewMember>,
) -> ApiResult<(StatusCode, ApiJson<Membership>)> {
    let membership = state
        .services
        .projects
        .add_member(&auth, project_id, input)
        .await?;
    Ok((StatusCode::CREATED, ApiJson(membership)))
}

pub async fn update_member_role(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, user_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(input): ApiJson<UpdateMemberRole>,
) -> ApiResult<ApiJson<Membership>> {
    let membership = state
        .services
        .projects
        .update_member_role(&auth, project_id, user_id, input.role)
        .await?;
    Ok(ApiJson(membership))
}

pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((project_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiJson<MessageResponse>> {
    state
        .services
        .projects
        .remove_member(&auth, project_id, user_id)
        .await?;
    Ok(ApiJson(MessageResponse::new("Member removed")))
}
