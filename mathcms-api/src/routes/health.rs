/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "success": true,
///   "data": { "status": "healthy", "version": "0.1.0", "storage": "postgres", "database": "connected" }
/// }
/// ```

use crate::response::Envelope;
use axum::extract::State;
use mathcms_shared::store::Backend;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    /// Storage backend in use
    pub storage: String,

    /// `connected` or `disconnected`
    pub database: String,
}

pub async fn health_check(State(backend): State<Backend>) -> Envelope<HealthResponse> {
    let connected = backend.ping().await;

    Envelope::ok(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: backend.name().to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
