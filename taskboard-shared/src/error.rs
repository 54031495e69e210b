/// Error taxonomy shared by every Taskboard component
///
/// Components raise a concrete [`CoreError`] variant; each variant belongs to
/// exactly one [`ErrorKind`], which decides the HTTP status and the `kind`
/// field of the error envelope.
///
/// # Envelope
///
/// Every failure leaves the server in the same shape:
///
/// ```json
/// { "error": { "kind": "NotFoundError", "message": "Task 3f0c... not found" } }
/// ```
///
/// Internal failures are logged server-side and rendered with a generic
/// message so store details never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::TokenError;
use crate::store::StoreError;

/// Result alias used across the service layer
pub type CoreResult<T> = Result<T, CoreError>;

/// Error categories surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or malformed input (400)
    ValidationError,

    /// Missing, invalid or expired credentials (401)
    AuthenticationError,

    /// Role or ownership check failed (403)
    AuthorizationError,

    /// Referenced entity is absent (404)
    NotFoundError,

    /// Uniqueness violation or stale write (409)
    ConflictError,

    /// Unexpected store or infrastructure failure (500)
    InternalError,
}

impl ErrorKind {
    /// HTTP status code for this kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::AuthenticationError => StatusCode::UNAUTHORIZED,
            ErrorKind::AuthorizationError => StatusCode::FORBIDDEN,
            ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
            ErrorKind::ConflictError => StatusCode::CONFLICT,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Concrete failures raised by the core components
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation
    #[error("{0}")]
    Validation(String),

    /// Role value is not one of the enumerated roles
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Username is already taken
    #[error("Username already exists")]
    DuplicateUsername,

    /// Email is already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown email, wrong password or deactivated account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No usable bearer token on the request
    #[error("{0}")]
    Unauthenticated(String),

    /// Bearer token was rejected by the verifier
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Caller lacks the role or ownership required
    #[error("{0}")]
    Forbidden(String),

    /// Assignee is not a member of the task's project
    #[error("User {0} is not a member of the task's project")]
    InvalidAssignee(Uuid),

    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. "Task"
        entity: &'static str,
        /// Identifier that was looked up
        id: Uuid,
    },

    /// Update was based on an outdated copy of the record
    #[error("Task was modified since it was read; reload and retry")]
    StaleWrite,

    /// Other uniqueness or reference conflict
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; detail is for logs only
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CoreError::NotFound { entity, id }
    }

    /// Shorthand for [`CoreError::Validation`]
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    /// Shorthand for [`CoreError::Forbidden`]
    pub fn forbidden(message: impl Into<String>) -> Self {
        CoreError::Forbidden(message.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::InvalidRole(_) | CoreError::InvalidAssignee(_) => {
                ErrorKind::ValidationError
            }
            CoreError::InvalidCredentials | CoreError::Unauthenticated(_) => {
                ErrorKind::AuthenticationError
            }
            CoreError::Token(TokenError::Signing(_)) => ErrorKind::InternalError,
            CoreError::Token(_) => ErrorKind::AuthenticationError,
            CoreError::Forbidden(_) => ErrorKind::AuthorizationError,
            CoreError::NotFound { .. } => ErrorKind::NotFoundError,
            CoreError::DuplicateUsername
            | CoreError::DuplicateEmail
            | CoreError::StaleWrite
            | CoreError::Conflict(_) => ErrorKind::ConflictError,
            CoreError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::InternalError => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                CoreError::Conflict(format!("Resource already exists ({})", constraint))
            }
            StoreError::ForeignKeyViolation { constraint } => CoreError::Conflict(format!(
                "Referenced resource is missing or still in use ({})",
                constraint
            )),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

/// Error envelope body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error details
    pub error: ErrorDetail,
}

/// Kind and message of a failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error category
    pub kind: ErrorKind,

    /// Human-readable message
    pub message: String,
}

impl ErrorBody {
    /// Builds an envelope from kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                kind,
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        if kind == ErrorKind::InternalError {
            tracing::error!(error = %self, "Internal error");
        }

        let body = ErrorBody::new(kind, self.public_message());
        (kind.status_code(), Json(body)).into_response()
    }
}
