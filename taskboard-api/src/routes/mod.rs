/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and current role lookup
/// - `users`: Account administration
/// - `projects`: Projects and their members
/// - `tasks`: Task lifecycle
/// - `comments`: Comment threads on tasks
///
/// Handlers stay thin: authorization and validation of domain rules live in
/// the services, so each handler extracts, delegates and shapes the reply.

use serde::Serialize;

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

/// Body for operations that return no resource
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
