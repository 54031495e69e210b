/// Request authentication for Axum
///
/// [`authenticate`] resolves the caller from an `Authorization: Bearer`
/// header. The API's auth layer calls it once per request and stores the
/// resulting [`AuthContext`] in the request extensions; handlers then take
/// `AuthContext` as an extractor.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("{} ({})", auth.email, auth.role)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{Claims, TokenIssuer};
use crate::error::CoreError;
use crate::models::user::Role;

/// Identity of the authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email from the token
    pub email: String,

    /// Role from the token, as of issuance
    pub role: Role,
}

impl AuthContext {
    /// Whether the caller is an admin
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Extracts the bearer token from the headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller from the request headers
///
/// # Errors
///
/// [`CoreError::Unauthenticated`] without a bearer token,
/// [`CoreError::Token`] when the token fails verification.
pub fn authenticate(headers: &HeaderMap, issuer: &TokenIssuer) -> Result<AuthContext, CoreError> {
    let token = bearer_token(headers)
        .ok_or_else(|| CoreError::Unauthenticated("Missing bearer token".to_string()))?;

    let claims = issuer.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        CoreError::Token(e)
    })?;

    Ok(claims.into())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| CoreError::Unauthenticated("Authentication required".to_string()))
    }
}
