//! Authentication module: the orchestrator over register/login/refresh/
//! logout, the HTTP handlers, and the bearer-token extractor used at the
//! trust boundary.

pub mod handlers;
pub mod middleware;
mod service;

pub use middleware::AuthenticatedUser;
pub use service::{AuthResponse, AuthService, LoginRequest, RefreshRequest, RegisterRequest};
