/// Bearer token issuance and verification
///
/// Tokens are HS256 JWTs carrying identity and role. Verification is pure:
/// it never looks at the user record, so a role change only takes effect
/// for tokens issued after it. Keep the lifetime short.
///
/// # Claims
///
/// - `sub`: user ID
/// - `email`, `role`: identity at issuance time
/// - `iss`: always `"taskboard"`
/// - `iat`, `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskboard_shared::auth::jwt::TokenIssuer;
/// use taskboard_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("a-secret-that-is-at-least-32-bytes!", Duration::hours(1));
/// let user_id = Uuid::new_v4();
/// let token = issuer.issue_for(user_id, "ada@example.com", Role::Admin)?;
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.role, Role::Admin);
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{PublicUser, Role};

/// Issuer claim on every token
pub const ISSUER: &str = "taskboard";

/// Error type for token operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token is not a parseable JWT for this issuer
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match the payload
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is past its expiry
    #[error("Token has expired")]
    Expired,

    /// Token could not be signed
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Email at issuance
    pub email: String,

    /// Role at issuance
    pub role: Role,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies bearer tokens with one server-held secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates an issuer; `ttl` is the lifetime of issued tokens
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for a user with the configured lifetime
    pub fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        self.issue_for(user.id, &user.email, user.role)
    }

    /// Issues a token from raw identity fields
    pub fn issue_for(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, email, role, self.ttl)
    }

    /// Issues a token with an explicit lifetime
    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature, issuer and expiry and returns the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
