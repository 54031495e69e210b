/// Domain models for Taskboard
///
/// These types are shared by the store adapters (via `sqlx::FromRow`) and the
/// HTTP layer (via serde). Closed sets such as roles, task status and
/// priority are enums at the boundary, never free-form strings.
///
/// # Models
///
/// - `user`: Accounts, global roles and the password-free public view
/// - `project`: Projects, the parent of tasks and memberships
/// - `membership`: Project membership with a role inside the project
/// - `task`: Tasks with status, priority and patches
/// - `comment`: Append-ordered discussion on a task

pub mod comment;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};

/// Current time truncated to microseconds, the precision `TIMESTAMPTZ` keeps
///
/// Every stamped `created_at`/`updated_at` goes through here, so a value
/// handed back to a client compares equal to the stored one.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Deserializes a field that distinguishes "absent" from "explicitly null"
///
/// Used with `#[serde(default, deserialize_with = "double_option")]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
