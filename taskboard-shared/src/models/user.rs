/// User model
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'project_manager', 'team_member');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     role user_role NOT NULL DEFAULT 'team_member',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL
/// );
/// ```
///
/// [`User`] carries the password hash and deliberately does not implement
/// `Serialize`. Anything leaving the credential store is a [`PublicUser`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Global account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to every project and account
    Admin,

    /// Creates projects and manages the ones they belong to
    ProjectManager,

    /// Works on tasks in the projects they belong to
    #[default]
    TeamMember,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Role; 3] = [Role::Admin, Role::ProjectManager, Role::TeamMember];

    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::TeamMember => "team_member",
        }
    }

    /// Whether this is the admin role
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CoreError::InvalidRole(s.to_string()))
    }
}

/// Stored user account, including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Unique login handle, also used as display name
    pub username: String,

    /// Unique email, stored lowercase
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Global role
    pub role: Role,

    /// Deactivated accounts cannot log in
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last changed
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Strips the password hash
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as seen outside the credential store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        user.into_public()
    }
}

/// Registration input
///
/// `role` stays a string here so an unknown value surfaces as
/// [`CoreError::InvalidRole`] instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "user_role")]
    pub role: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Profile update input
///
/// All fields are optional. `first_name`/`last_name` use `Some(None)` to clear.
/// `role` and `is_active` are only honoured for admins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Plaintext; re-hashed before storage and then dropped
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub first_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "super::double_option")]
    pub last_name: Option<Option<String>>,

    #[serde(default, alias = "user_role")]
    pub role: Option<String>,

    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ProfileUpdate {
    /// Whether the update touches admin-only fields
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}
