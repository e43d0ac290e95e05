//! # MathCMS API Server Library
//!
//! REST backend for a mathematics research center: news, events,
//! documents, researcher profiles, repositories and time tracking.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `client`: Typed HTTP client for the API
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors with envelope rejections
//! - `middleware`: Authentication gate and security headers
//! - `response`: Success and failure envelopes
//! - `routes`: API route handlers
//! - `uploads`: File upload storage

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod uploads;
