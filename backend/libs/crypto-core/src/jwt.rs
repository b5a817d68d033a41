/// JWT signing and validation for Trip Tide services
///
/// Tokens are HS256-signed with a shared secret loaded from configuration.
/// A single [`JwtKeys`] value is built at startup and shared (behind an `Arc`)
/// between the login/registration resolvers, which issue tokens, and the HTTP
/// middleware, which validates them.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::{JwtKeys, TokenSubject};
///
/// let keys = JwtKeys::from_secret("change-me", "trip-tide", 7200);
/// let token = keys
///     .issue_token(&TokenSubject {
///         user_id: "64b7f0c2a1e4b3d2c1f0e9a8",
///         username: "wanderer",
///         email: "wanderer@example.com",
///     })
///     .unwrap();
///
/// let claims = keys.validate_token(&token).unwrap();
/// assert_eq!(claims.username, "wanderer");
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Default token lifetime, matching the two hour sessions of the web client
pub const DEFAULT_EXPIRY_SECONDS: i64 = 2 * 60 * 60;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// JWT Claims structure - standard claims plus the viewer's public profile
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user id as a hex object id)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
}

/// The identity a token is issued for
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
}

// ============================================================================
// Key Storage
// ============================================================================

/// Signing and validation keys plus token policy
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    expiry_seconds: i64,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

impl JwtKeys {
    /// Build keys from a shared HMAC secret
    pub fn from_secret(secret: &str, issuer: impl Into<String>, expiry_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            expiry_seconds,
        }
    }

    // ========================================================================
    // Token Generation
    // ========================================================================

    /// Sign a token for the given subject
    pub fn issue_token(&self, subject: &TokenSubject<'_>) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.expiry_seconds);

        let claims = Claims {
            sub: subject.user_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            iss: self.issuer.clone(),
            username: subject.username.to_string(),
            email: subject.email.to_string(),
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.encoding)
            .map_err(|e| anyhow!("Failed to generate token: {e}"))
    }

    // ========================================================================
    // Token Validation
    // ========================================================================

    /// Validate signature, expiry and issuer, returning the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
