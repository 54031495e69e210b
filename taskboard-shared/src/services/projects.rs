/// Projects and memberships.
///
/// Membership decides who may see a project's members and who may be
/// assigned its tasks. Removing a member also unassigns their tasks in the
/// project, so an assignee is always a member.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{require_project_manager, require_project_member, require_role};
use crate::auth::middleware::AuthContext;
use crate::error::{CoreError, CoreResult};
use crate::models;
use crate::models::membership::{MemberView, Membership, NewMember, ProjectRole};
use crate::models::project::{NewProject, Project};
use crate::models::user::Role;
use crate::services::{check_length, MAX_PROJECT_NAME_LEN};
use crate::store::{Store, StoreError};

/// Project and membership operations over a [`Store`]
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn project(&self, id: Uuid) -> CoreResult<Project> {
        self.store
            .find_project(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))
    }

    /// Creates a project; admin or project_manager
    ///
    /// The creator joins the project as its manager.
    pub async fn create_project(&self, actor: &AuthContext, input: NewProject) -> CoreResult<Project> {
        require_role(actor, &[Role::Admin, Role::ProjectManager])?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Project name is required"));
        }
        check_length("Project name", name, MAX_PROJECT_NAME_LEN)?;

        let now = models::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: input.description,
            created_by: Some(actor.user_id),
            created_at: now,
            updated_at: now,
        };
        let manager = Membership {
            project_id: project.id,
            user_id: actor.user_id,
            role: ProjectRole::Manager,
            created_at: now,
        };
        self.store
            .insert_project_with_manager(&project, &manager)
            .await?;

        info!(project_id = %project.id, actor = %actor.user_id, "Project created");
        Ok(project)
    }

    /// Adds a member; project manager or admin
    pub async fn add_member(
        &self,
        actor: &AuthContext,
        project_id: Uuid,
        input: NewMember,
    ) -> CoreResult<Membership> {
        self.project(project_id).await?;
        require_project_manager(self.store.as_ref(), actor, project_id).await?;

        if self.store.find_user(input.user_id).await?.is_none() {
            return Err(CoreError::not_found("User", input.user_id));
        }

        let membership = Membership {
            project_id,
            user_id: input.user_id,
            role: input.role,
            created_at: models::now(),
        };

        self.store
            .insert_membership(&membership)
            .await
            .map_err(|err| match err {
                StoreError::UniqueViolation { .. } => {
                    CoreError::Conflict("User is already a member of this project".to_string())
                }
                other => other.into(),
            })?;

        info!(%project_id, user_id = %input.user_id, role = input.role.as_str(), "Member added");
        Ok(membership)
    }

    /// Lists members with usernames; member or admin
    pub async fn list_members(
        &self,
        actor: &AuthContext,
        project_id: Uuid,
    ) -> CoreResult<Vec<MemberView>> {
        self.project(project_id).await?;
        require_project_member(self.store.as_ref(), actor, project_id).await?;

        Ok(self.store.list_members(project_id).await?)
    }

    /// Changes a member's project role; admin only
    pub async fn update_member_role(
        &self,
        actor: &AuthContext,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> CoreResult<Membership> {
        require_role(actor, &[Role::Admin])?;

        let membership = self
            .store
            .update_membership_role(project_id, user_id, role)
            .await?
            .ok_or_else(|| CoreError::not_found("Project member", user_id))?;

        info!(%project_id, %user_id, role = role.as_str(), "Member role changed");
        Ok(membership)
    }

    /// Removes a member and unassigns their tasks; project manager or admin
    pub async fn remove_member(
        &self,
        actor: &AuthContext,
        project_id: Uuid,
        user_id: Uuid,
    ) -> CoreResult<()> {
        self.project(project_id).await?;
        require_project_manager(self.store.as_ref(), actor, project_id).await?;

        if !self.store.delete_membership(project_id, user_id).await? {
            return Err(CoreError::not_found("Project member", user_id));
        }

        info!(%project_id, %user_id, actor = %actor.user_id, "Member removed");
        Ok(())
    }
}
