//! # Taskboard API Server Library
//!
//! HTTP surface of Taskboard: configuration, router and handlers over the
//! services in `taskboard-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error envelope and request extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
