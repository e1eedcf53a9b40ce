pub mod resolver;

pub use resolver::{LoginError, LoginRequest, get_or_create_session};

/// Name of the session cookie issued on login.
pub const SESSION_COOKIE: &str = "sessionId";
