/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and verification
/// - [`middleware`]: Resolving the caller from a request
/// - [`authorization`]: Role, ownership and project membership checks
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskboard_shared::auth::jwt::TokenIssuer;
/// use taskboard_shared::auth::password::{hash_password, verify_password, PasswordPolicy};
/// use taskboard_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", &PasswordPolicy::default())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let issuer = TokenIssuer::new("jwt-secret-of-at-least-32-bytes!!", Duration::hours(1));
/// let token = issuer.issue_for(Uuid::new_v4(), "ada@example.com", Role::TeamMember)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
