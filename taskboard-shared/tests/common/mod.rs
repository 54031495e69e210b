//! Shared fixtures for service tests over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::auth::password::PasswordPolicy;
use taskboard_shared::models::membership::{NewMember, ProjectRole};
use taskboard_shared::models::project::{NewProject, Project};
use taskboard_shared::models::user::{NewAccount, PublicUser};
use taskboard_shared::services::Services;
use taskboard_shared::store::InMemoryStore;

/// Cheap hashing so tests stay fast
pub fn test_policy() -> PasswordPolicy {
    PasswordPolicy {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn services() -> Services {
    Services::new(Arc::new(InMemoryStore::new()), test_policy())
}

pub fn account(username: &str, role: Option<&str>) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: format!("{username}-password"),
        role: role.map(str::to_string),
        first_name: None,
        last_name: None,
    }
}

pub async fn register(services: &Services, username: &str, role: &str) -> PublicUser {
    services
        .accounts
        .create_account(account(username, Some(role)))
        .await
        .expect("registration should succeed")
}

pub fn ctx(user: &PublicUser) -> AuthContext {
    AuthContext {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

/// Creates a project owned by `manager` and adds `members` to it
pub async fn project_with(
    services: &Services,
    manager: &PublicUser,
    members: &[&PublicUser],
) -> Project {
    let project = services
        .projects
        .create_project(
            &ctx(manager),
            NewProject {
                name: "Apollo".to_string(),
                description: None,
            },
        )
        .await
        .expect("project creation should succeed");

    for member in members {
        services
            .projects
            .add_member(
                &ctx(manager),
                project.id,
                NewMember {
                    user_id: member.id,
                    role: ProjectRole::Member,
                },
            )
            .await
            .expect("adding member should succeed");
    }

    project
}
