/// Role to landing view mapping, consumed after login and registration.

use serde::Serialize;

use crate::models::user::Role;

/// Default landing view for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DashboardView {
    Admin,
    Manager,
    Team,
    Generic,
}

impl DashboardView {
    /// Client route of the view
    pub fn path(&self) -> &'static str {
        match self {
            DashboardView::Admin => "/admin/dashboard",
            DashboardView::Manager => "/project-manager/dashboard",
            DashboardView::Team => "/team-member/dashboard",
            DashboardView::Generic => "/dashboard",
        }
    }
}

impl From<Role> for DashboardView {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => DashboardView::Admin,
            Role::ProjectManager => DashboardView::Manager,
            Role::TeamMember => DashboardView::Team,
        }
    }
}

/// Maps a raw role string; anything unrecognised gets the generic view
pub fn default_view_for(role: &str) -> DashboardView {
    role.parse::<Role>()
        .map(DashboardView::from)
        .unwrap_or(DashboardView::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_views() {
        assert_eq!(default_view_for("admin").path(), "/admin/dashboard");
        assert_eq!(default_view_for("project_manager").path(), "/project-manager/dashboard");
        assert_eq!(default_view_for("team_member").path(), "/team-member/dashboard");
        assert_eq!(default_view_for("intern"), DashboardView::Generic);
        assert_eq!(default_view_for("").path(), "/dashboard");
    }

    #[test]
    fn test_every_role_has_a_dedicated_view() {
        for role in Role::ALL {
            assert_ne!(DashboardView::from(role), DashboardView::Generic);
        }
    }
}
