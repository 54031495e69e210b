/// Error handling for the API server
///
/// Handlers return [`ApiResult`]. Domain failures arrive as [`CoreError`]
/// and keep their own kind; request-shape failures (bad JSON, a path
/// segment that is not a UUID, a DTO that fails validation) are reported
/// as `ValidationError`. Every failure uses the same envelope:
///
/// ```json
/// { "error": { "kind": "ValidationError", "message": "email: Invalid email format" } }
/// ```
///
/// # Example
///
/// ```
/// use taskboard_api::error::{ApiJson, ApiResult};
///
/// async fn echo(ApiJson(body): ApiJson<serde_json::Value>) -> ApiResult<ApiJson<serde_json::Value>> {
///     Ok(ApiJson(body))
/// }
/// ```

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use taskboard_shared::error::{CoreError, ErrorBody, ErrorKind};
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Failure raised by a service
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Body or path could not be decoded
    #[error("{0}")]
    BadRequest(String),

    /// Request DTO failed field validation
    #[error("{}", describe(.0))]
    Invalid(#[from] ValidationErrors),

    /// No route matches the request path
    #[error("No route for {0}")]
    RouteNotFound(String),
}

/// Renders field errors as `field: message` pairs in field order
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let message = errors
                .iter()
                .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
                .next()
                .unwrap_or_else(|| "is invalid".to_string());
            (field.to_string(), message)
        })
        .collect();
    fields.sort();

    fields
        .into_iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Core(err) => err.kind(),
            ApiError::BadRequest(_) | ApiError::Invalid(_) => ErrorKind::ValidationError,
            ApiError::RouteNotFound(_) => ErrorKind::NotFoundError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Core(err) => err.into_response(),
            other => {
                let kind = other.kind();
                tracing::debug!(error = %other, "Rejected request");
                (kind.status_code(), Json(ErrorBody::new(kind, other.to_string()))).into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor and response whose rejections use the error envelope
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// Path extractor whose rejections use the error envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
