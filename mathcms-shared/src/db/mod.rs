/// Postgres connectivity
///
/// - `pool`: connection pool creation and health checks
/// - `migrations`: embedded schema migrations (`migrations/` in this crate)

pub mod migrations;
pub mod pool;
