//! Token signing and password hashing shared by Trip Tide services

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtKeys, TokenSubject};
pub use password::{hash_password, verify_password, PasswordError};
