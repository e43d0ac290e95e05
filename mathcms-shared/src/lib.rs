//! # MathCMS Shared Library
//!
//! Domain types and business logic for the MathCMS content API.
//!
//! ## Module Organization
//!
//! - `models`: collection documents, payloads and field rules
//! - `store`: document storage (Postgres JSONB or in-memory)
//! - `services`: CRUD and the derived views built on it
//! - `auth`: password hashing and JWT tokens
//! - `db`: Postgres pool and migrations
//! - `stats`: rating tiers, relative times, growth percentages
//! - `validation`: field error reporting

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod stats;
pub mod store;
pub mod validation;

/// Current version of the MathCMS shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
