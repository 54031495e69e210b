/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::db::pool::{create_pool, PoolConfig};
/// use taskboard_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(PoolConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use taskboard_shared::{
    auth::{jwt::TokenIssuer, middleware::authenticate, password::PasswordPolicy},
    error::{ErrorBody, ErrorKind},
    services::Services,
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Domain services over the configured store
    pub services: Services,

    /// Bearer token issuer and verifier
    pub tokens: Arc<TokenIssuer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state with the default password policy
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self::with_policy(store, config, PasswordPolicy::default())
    }

    /// Creates application state with an explicit password policy
    pub fn with_policy(store: Arc<dyn Store>, config: Config, policy: PasswordPolicy) -> Self {
        let tokens = TokenIssuer::new(&config.jwt.secret, config.token_ttl());
        Self {
            services: Services::new(store, policy),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                         (public)
/// ├── POST   /auth/register                  (public)
/// ├── POST   /auth/login                     (public)
/// ├── GET    /auth/user-role
/// ├── GET    /users
/// ├── GET    /users/:id
/// ├── PUT    /users/:id
/// ├── DELETE /users/:id
/// ├── POST   /projects
/// ├── GET    /projects/:id/members
/// ├── POST   /projects/:id/members
/// ├── PUT    /projects/:id/members/:user_id
/// ├── DELETE /projects/:id/members/:user_id
/// ├── GET    /tasks
/// ├── POST   /tasks
/// ├── GET    /tasks/user/:user_id
/// ├── GET    /tasks/project/:project_id
/// ├── PUT    /tasks/:id
/// ├── DELETE /tasks/:id
/// ├── GET    /comments/task/:task_id
/// ├── POST   /comments
/// └── DELETE /comments/:id
/// ```
///
/// Everything not marked public requires a bearer token.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Error envelope for 405 responses
/// 4. Authentication (protected routes only)
///
/// Unknown paths answer 404 with the error envelope.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/auth/user-role", get(routes::auth::user_role))
        .route("/users", get(routes::users::list_users))
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/projects", post(routes::projects::create_project))
        .route(
            "/projects/:id/members",
            get(routes::projects::list_members).post(routes::projects::add_member),
        )
        .route(
            "/projects/:id/members/:user_id",
            put(routes::projects::update_member_role).delete(routes::projects::remove_member),
        )
        .route(
            "/tasks",
            get(routes::tasks::my_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/user/:user_id", get(routes::tasks::user_tasks))
        .route("/tasks/project/:project_id", get(routes::tasks::project_tasks))
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/comments", post(routes::comments::create_comment))
        .route("/comments/task/:task_id", get(routes::comments::task_comments))
        .route(
            "/comments/:id",
            axum::routing::delete(routes::comments::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(middleware::map_response(method_not_allowed_envelope))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// CORS from configured origins; `*` is permissive
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound(format!("{} {}", method, uri.path()))
}

/// Gives axum's empty 405 the error envelope, keeping the `Allow` header
async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut envelope = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new(
            ErrorKind::NotFoundError,
            "Method not allowed for this path",
        )),
    )
        .into_response();
    if let Some(allow) = allow {
        envelope.headers_mut().insert(header::ALLOW, allow);
    }
    envelope
}

/// Bearer token authentication layer
///
/// Verifies the token and injects [`AuthContext`](taskboard_shared::auth::middleware::AuthContext)
/// into request extensions for handlers to extract.
async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), &state.tokens)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
