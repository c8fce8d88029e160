pub mod auth;
pub mod route_guard;

pub use auth::{session_middleware, CurrentSession, SessionContext};
pub use route_guard::route_guard_middleware;
