/// Credential store: registration, login and profile management.
///
/// Plaintext passwords exist only for the duration of a call; they are
/// hashed on the blocking pool and never logged. Nothing returned from this
/// service carries the password hash.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::authorization::{require_owner_or_admin, require_role};
use crate::auth::middleware::AuthContext;
use crate::auth::password::{
    hash_password_async, verify_password_async, PasswordError, PasswordPolicy,
};
use crate::error::{CoreError, CoreResult};
use crate::models;
use crate::models::user::{NewAccount, ProfileUpdate, PublicUser, Role, User};
use crate::services::{check_length, MAX_EMAIL_LEN, MAX_PERSON_NAME_LEN, MAX_USERNAME_LEN};
use crate::store::{Store, StoreError};

/// Account operations over a [`Store`]
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    policy: PasswordPolicy,
}

impl From<PasswordError> for CoreError {
    fn from(err: PasswordError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

/// Translates a unique violation on `users` into the matching duplicate error
fn duplicate_account(err: StoreError) -> CoreError {
    match &err {
        StoreError::UniqueViolation { constraint } if constraint.contains("email") => {
            CoreError::DuplicateEmail
        }
        StoreError::UniqueViolation { constraint } if constraint.contains("username") => {
            CoreError::DuplicateUsername
        }
        _ => err.into(),
    }
}

fn normalize_email(email: &str) -> CoreResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoreError::validation("Email is required"));
    }
    if !email.contains('@') {
        return Err(CoreError::validation("Email is not valid"));
    }
    check_length("Email", &email, MAX_EMAIL_LEN)?;
    Ok(email)
}

fn normalize_username(username: &str) -> CoreResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CoreError::validation("Username is required"));
    }
    check_length("Username", username, MAX_USERNAME_LEN)?;
    Ok(username.to_string())
}

fn check_person_name(field: &str, name: Option<&str>) -> CoreResult<()> {
    match name {
        Some(name) => check_length(field, name, MAX_PERSON_NAME_LEN),
        None => Ok(()),
    }
}

fn require_password(password: &str) -> CoreResult<()> {
    if password.is_empty() {
        return Err(CoreError::validation("Password is required"));
    }
    Ok(())
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, policy: PasswordPolicy) -> Self {
        Self { store, policy }
    }

    /// Registers a new account
    ///
    /// Uniqueness is left to the store's constraints; a violation comes back
    /// as [`CoreError::DuplicateEmail`] or [`CoreError::DuplicateUsername`].
    pub async fn create_account(&self, input: NewAccount) -> CoreResult<PublicUser> {
        let username = normalize_username(&input.username)?;
        let email = normalize_email(&input.email)?;
        require_password(&input.password)?;
        check_person_name("First name", input.first_name.as_deref())?;
        check_person_name("Last name", input.last_name.as_deref())?;

        let role = match input.role.as_deref() {
            Some(role) => role.trim().parse::<Role>()?,
            None => Role::default(),
        };

        let password_hash = hash_password_async(input.password, self.policy).await?;

        let now = models::now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_user(&user).await.map_err(duplicate_account)?;

        info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user.into_public())
    }

    /// Checks an email/password pair
    ///
    /// Unknown email, wrong password and deactivated account all fail with
    /// the same [`CoreError::InvalidCredentials`].
    pub async fn verify_credentials(&self, email: &str, password: &str) -> CoreResult<PublicUser> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(CoreError::validation("Email and password are required"));
        }

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            // Spend the same hashing time as a real check.
            let _ = hash_password_async(password.to_string(), self.policy).await;
            warn!("Login failed: invalid credentials");
            return Err(CoreError::InvalidCredentials);
        };

        let matches =
            verify_password_async(password.to_string(), user.password_hash.clone()).await?;

        if !matches || !user.is_active {
            warn!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(CoreError::InvalidCredentials);
        }

        info!(user_id = %user.id, "Login succeeded");
        Ok(user.into_public())
    }

    /// Fetches an account; self or admin
    pub async fn get_account(&self, actor: &AuthContext, id: Uuid) -> CoreResult<PublicUser> {
        require_owner_or_admin(actor, id)?;

        self.store
            .find_user(id)
            .await?
            .map(User::into_public)
            .ok_or_else(|| CoreError::not_found("User", id))
    }

    /// Lists all accounts by username; admin only
    pub async fn list_accounts(&self, actor: &AuthContext) -> CoreResult<Vec<PublicUser>> {
        require_role(actor, &[Role::Admin])?;

        let users = self.store.list_users().await?;
        debug!(count = users.len(), "Listed accounts");
        Ok(users.into_iter().map(User::into_public).collect())
    }

    /// Updates a profile; self or admin
    ///
    /// `role` and `is_active` are only accepted from admins. A new password
    /// is re-hashed before it is stored.
    pub async fn update_profile(
        &self,
        actor: &AuthContext,
        id: Uuid,
        update: ProfileUpdate,
    ) -> CoreResult<PublicUser> {
        require_owner_or_admin(actor, id)?;
        if update.touches_privileged_fields() {
            require_role(actor, &[Role::Admin])?;
        }

        let mut user = self
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))?;

        if let Some(username) = &update.username {
            user.username = normalize_username(username)?;
        }
        if let Some(email) = &update.email {
            user.email = normalize_email(email)?;
        }
        if let Some(first_name) = update.first_name {
            check_person_name("First name", first_name.as_deref())?;
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            check_person_name("Last name", last_name.as_deref())?;
            user.last_name = last_name;
        }
        if let Some(role) = &update.role {
            user.role = role.trim().parse()?;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(password) = update.password {
            require_password(&password)?;
            user.password_hash = hash_password_async(password, self.policy).await?;
        }
        user.updated_at = models::now();

        let updated = self
            .store
            .update_user(&user)
            .await
            .map_err(duplicate_account)?
            .ok_or_else(|| CoreError::not_found("User", id))?;

        info!(user_id = %id, actor = %actor.user_id, "Profile updated");
        Ok(updated.into_public())
    }

    /// Deletes an account; admin only
    ///
    /// Fails with a conflict while the user still has tasks they created or
    /// comments they wrote.
    pub async fn delete_account(&self, actor: &AuthContext, id: Uuid) -> CoreResult<()> {
        require_role(actor, &[Role::Admin])?;

        let deleted = self.store.delete_user(id).await.map_err(|err| match err {
            StoreError::ForeignKeyViolation { .. } => CoreError::Conflict(
                "User still has tasks or comments; deactivate the account instead".to_string(),
            ),
            other => other.into(),
        })?;

        if !deleted {
            return Err(CoreError::not_found("User", id));
        }

        info!(user_id = %id, actor = %actor.user_id, "Account deleted");
        Ok(())
    }
}
