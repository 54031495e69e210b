/// Service layer
///
/// Each service owns one slice of the domain and talks to persistence only
/// through [`Store`]. Authorization happens here, not in the HTTP layer, so
/// the rules hold for every caller.
///
/// - [`accounts`]: credential store (registration, login, profiles)
/// - [`projects`]: projects and memberships
/// - [`tasks`]: task lifecycle and listing order
/// - [`comments`]: comment threads on tasks
/// - [`views`]: role to landing view mapping

pub mod accounts;
pub mod comments;
pub mod projects;
pub mod tasks;
pub mod views;

use std::sync::Arc;

use crate::auth::password::PasswordPolicy;
use crate::error::{CoreError, CoreResult};
use crate::store::Store;

pub use accounts::AccountService;
pub use comments::CommentService;
pub use projects::ProjectService;
pub use tasks::TaskService;

/// Column widths from the schema, in characters
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_PERSON_NAME_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_PROJECT_NAME_LEN: usize = 255;

/// Rejects `value` when it is longer than its column allows
pub(crate) fn check_length(field: &str, value: &str, max: usize) -> CoreResult<()> {
    if value.chars().count() > max {
        return Err(CoreError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// All services over one store
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub comments: CommentService,
    store: Arc<dyn Store>,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, policy: PasswordPolicy) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), policy),
            projects: ProjectService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            store,
        }
    }

    /// The shared store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
