/// Role and ownership checks
///
/// # Permission Model
///
/// 1. **Global role**: `admin` passes every check; `project_manager` may
///    create projects and manage projects they belong to.
/// 2. **Project membership**: non-admins only act inside projects they are
///    members of.
/// 3. **Ownership**: profile edits and comment deletion are limited to the
///    owner or an admin.
///
/// Every check fails with [`CoreError::Forbidden`] and logs the denial.

use tracing::warn;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::error::{CoreError, CoreResult};
use crate::models::membership::{Membership, ProjectRole};
use crate::models::user::Role;
use crate::store::Store;

/// Passes if the caller's role is one of `allowed`
pub fn require_role(ctx: &AuthContext, allowed: &[Role]) -> CoreResult<()> {
    if allowed.contains(&ctx.role) {
        return Ok(());
    }

    warn!(user_id = %ctx.user_id, role = %ctx.role, "Role check denied");
    Err(CoreError::forbidden("Insufficient role for this action"))
}

/// Passes if the caller owns the resource or is an admin
pub fn require_owner_or_admin(ctx: &AuthContext, owner_id: Uuid) -> CoreResult<()> {
    if ctx.user_id == owner_id || ctx.is_admin() {
        return Ok(());
    }

    warn!(user_id = %ctx.user_id, %owner_id, "Ownership check denied");
    Err(CoreError::forbidden("Only the owner or an admin may do this"))
}

/// Passes if the caller is a member of the project or an admin
///
/// Returns the caller's membership; `None` for an admin without one.
pub async fn require_project_member(
    store: &dyn Store,
    ctx: &AuthContext,
    project_id: Uuid,
) -> CoreResult<Option<Membership>> {
    let membership = store.find_membership(project_id, ctx.user_id).await?;

    if membership.is_some() || ctx.is_admin() {
        return Ok(membership);
    }

    warn!(user_id = %ctx.user_id, %project_id, "Project membership check denied");
    Err(CoreError::forbidden("Not a member of this project"))
}

/// Whether a caller with this membership manages the project
///
/// True for admins, for members holding the `manager` project role, and for
/// members whose global role is `project_manager`.
pub fn is_project_manager(ctx: &AuthContext, membership: Option<&Membership>) -> bool {
    if ctx.is_admin() {
        return true;
    }
    match membership {
        Some(m) => m.role == ProjectRole::Manager || ctx.role == Role::ProjectManager,
        None => false,
    }
}

/// Passes if the caller manages the project
pub async fn require_project_manager(
    store: &dyn Store,
    ctx: &AuthContext,
    project_id: Uuid,
) -> CoreResult<()> {
    let membership = require_project_member(store, ctx, project_id).await?;

    if is_project_manager(ctx, membership.as_ref()) {
        return Ok(());
    }

    warn!(user_id = %ctx.user_id, %project_id, "Project manager check denied");
    Err(CoreError::forbidden("Only a project manager or admin may do this"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, ProjectStore, UserStore};
    use chrono::Utc;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        let pm = ctx(Role::ProjectManager);
        assert!(require_role(&pm, &[Role::Admin, Role::ProjectManager]).is_ok());
        assert!(matches!(
            require_role(&pm, &[Role::Admin]),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_owner_or_admin() {
        let member = ctx(Role::TeamMember);
        assert!(require_owner_or_admin(&member, member.user_id).is_ok());
        assert!(require_owner_or_admin(&member, Uuid::new_v4()).is_err());
        assert!(require_owner_or_admin(&ctx(Role::Admin), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_is_project_manager() {
        let membership = |role| Membership {
            project_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            created_at: Utc::now(),
        };
        let member = membership(ProjectRole::Member);
        let manager = membership(ProjectRole::Manager);

        assert!(is_project_manager(&ctx(Role::Admin), None));
        assert!(!is_project_manager(&ctx(Role::ProjectManager), None));
        assert!(is_project_manager(&ctx(Role::ProjectManager), Some(&member)));
        assert!(is_project_manager(&ctx(Role::TeamMember), Some(&manager)));
        assert!(!is_project_manager(&ctx(Role::TeamMember), Some(&member)));
    }

    #[tokio::test]
    async fn test_require_project_member() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let outsider = ctx(Role::ProjectManager);
        let project_id = Uuid::new_v4();

        store
            .insert_user(&crate::models::user::User {
                id: outsider.user_id,
                username: "pm".to_string(),
                email: outsider.email.clone(),
                password_hash: "x".to_string(),
                first_name: None,
                last_name: None,
                role: Role::ProjectManager,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        store
            .insert_project(&crate::models::project::Project {
                id: project_id,
                name: "p".to_string(),
                description: None,
                created_by: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        assert!(matches!(
            require_project_member(&store, &outsider, project_id).await,
            Err(CoreError::Forbidden(_))
        ));
        assert!(require_project_member(&store, &ctx(Role::Admin), project_id)
            .await
            .unwrap()
            .is_none());

        store
            .insert_membership(&Membership {
                project_id,
                user_id: outsider.user_id,
                role: ProjectRole::Member,
                created_at: now,
            })
            .await
            .unwrap();
        assert!(require_project_manager(&store, &outsider, project_id).await.is_ok());
    }
}
