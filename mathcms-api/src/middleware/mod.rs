/// HTTP middleware
///
/// - [`gate`]: bearer token authentication and role checks
/// - [`security`]: security response headers

pub mod gate;
pub mod security;
