//! Request middleware and viewer helpers

pub mod auth;
pub mod jwt;

pub use auth::{require_auth, Viewer};
pub use jwt::JwtMiddleware;
