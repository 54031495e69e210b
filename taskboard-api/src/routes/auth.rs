/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new account and get a token
/// - `POST /auth/login` - Log in and get a token
/// - `GET /auth/user-role` - Current role and landing view of the caller
///
/// Registration and login answer with the same shape:
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "ada", "role": "team_member", ... },
///   "redirectTo": "/team-member/dashboard"
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::user::{NewAccount, PublicUser, Role},
    services::views::DashboardView,
    CoreError,
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login handle
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Username must be 1 to 50 characters"))]
    pub username: String,

    /// Email address
    #[serde(default)]
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    /// Plaintext password
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Optional role; defaults to team_member
    #[serde(default, alias = "user_role")]
    pub role: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            role: req.role,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token, account and landing view
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,

    /// Authenticated account
    pub user: PublicUser,

    /// Client route of the role's default view
    #[serde(rename = "redirectTo")]
    pub redirect_to: String,
}

/// Current role response
#[derive(Debug, Serialize)]
pub struct UserRoleResponse {
    pub role: Role,

    #[serde(rename = "redirectTo")]
    pub redirect_to: String,
}

fn signed_in(state: &AppState, user: PublicUser) -> ApiResult<AuthResponse> {
    let token = state.tokens.issue(&user).map_err(CoreError::from)?;

    Ok(AuthResponse {
        token,
        redirect_to: DashboardView::from(user.role).path().to_string(),
        user,
    })
}

/// Register a new account
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown role
/// - `409 Conflict`: Email or username already exists
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, ApiJson<AuthResponse>)> {
    req.validate()?;

    let user = state.services.accounts.create_account(req.into()).await?;
    let response = signed_in(&state, user)?;

    Ok((StatusCode::CREATED, ApiJson(response)))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<ApiJson<AuthResponse>> {
    req.validate()?;

    let user = state
        .services
        .accounts
        .verify_credentials(&req.email, &req.password)
        .await?;

    Ok(ApiJson(signed_in(&state, user)?))
}

/// Role of the caller as currently stored, with its landing view
pub async fn user_role(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiJson<UserRoleResponse>> {
    let user = state.services.accounts.get_account(&auth, auth.user_id).await?;

    Ok(ApiJson(UserRoleResponse {
        role: user.role,
        redirect_to: DashboardView::from(user.role).path().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "correct horse",
            "user_role": "project_manager"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let account = NewAccount::from(req);
        assert_eq!(account.role.as_deref(), Some("project_manager"));

        let missing: RegisterRequest =
            serde_json::from_value(serde_json::json!({ "email": "ada@example.com" })).unwrap();
        let errors = missing.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_login_request_validation() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_auth_response_uses_redirect_key() {
        let now = chrono::Utc::now();
        let response = AuthResponse {
            token: "t".to_string(),
            user: PublicUser {
                id: uuid::Uuid::new_v4(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                first_name: None,
                last_name: None,
                role: Role::Admin,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            redirect_to: "/admin/dashboard".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["redirectTo"], "/admin/dashboard");
        assert!(json.get("redirect_to").is_none());
    }
}
