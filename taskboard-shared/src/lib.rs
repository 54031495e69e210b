//! # Taskboard Shared Library
//!
//! This crate contains the identity, authorization, task lifecycle and
//! comment logic used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Domain records and their wire/database representations
//! - `store`: Persistence port with PostgreSQL and in-memory adapters
//! - `db`: Connection pool and migrations for the PostgreSQL adapter
//! - `auth`: Password hashing, bearer tokens and the authorization guard
//! - `services`: Credential store, task lifecycle, comment threads, role views
//! - `error`: The error taxonomy shared by every component

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{CoreError, CoreResult, ErrorKind};

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
