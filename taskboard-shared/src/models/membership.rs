/// Project membership model
///
/// Membership is a pure relation between a user and a project. It decides
/// who may be assigned tasks in the project and who manages it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('manager', 'member');
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role project_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL,
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user inside one project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// Manages members and every task of the project
    Manager,

    /// Works on tasks of the project
    #[default]
    Member,
}

impl ProjectRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Manager => "manager",
            ProjectRole::Member => "member",
        }
    }
}

/// Membership row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Project ID
    pub project_id: Uuid,

    /// Member user ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// When the user joined the project
    pub created_at: DateTime<Utc>,
}

/// Membership joined with the member's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub membership: Membership,

    /// Member's username
    pub username: String,
}

/// Input for adding a member
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    /// User to add
    pub user_id: Uuid,

    /// Role within the project (defaults to member)
    #[serde(default)]
    pub role: ProjectRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_member_defaults_to_member() {
        let input: NewMember =
            serde_json::from_value(serde_json::json!({ "user_id": Uuid::new_v4() })).unwrap();
        assert_eq!(input.role, ProjectRole::Member);
    }

    #[test]
    fn test_member_view_flattens() {
        let view = MemberView {
            membership: Membership {
                project_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                role: ProjectRole::Manager,
                created_at: Utc::now(),
            },
            username: "grace".to_string(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["role"], "manager");
        assert_eq!(json["username"], "grace");
    }
}
