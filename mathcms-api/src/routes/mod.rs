/// API route handlers
///
/// - `resource`: the generic CRUD handlers and router shared by every collection
/// - `auth`: login, registration, current user
/// - `documents`: document upload and versions
/// - `researchers`: leaderboard and avatars
/// - `repositories`: owner-populated reads and visibility
/// - `dashboard`: admin statistics
/// - `uploads`: multipart intake and image uploads
/// - `health`: health check

pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod repositories;
pub mod researchers;
pub mod resource;
pub mod uploads;

use crate::{
    app::AppState,
    middleware::gate::{require_auth, Gate},
};
use axum::{middleware::from_fn_with_state, routing::MethodRouter};

/// Puts `route` behind `gate`
pub(crate) fn guard(route: MethodRouter<AppState>, gate: &Gate) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(gate.clone(), require_auth))
}
