//! Viewer resolution for GraphQL resolvers

use async_graphql::Context;
use bson::oid::ObjectId;
use crypto_core::Claims;
use error_types::{ServiceError, ServiceResult};

/// Rejection used by mutations when nobody is logged in
pub const LOGIN_REQUIRED: &str = "You need to be logged in";

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
}

impl Viewer {
    pub fn from_claims(claims: &Claims) -> ServiceResult<Self> {
        let id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ServiceError::unauthenticated("Invalid token subject"))?;

        Ok(Self {
            id,
            username: claims.username.clone(),
            email: claims.email.clone(),
        })
    }
}

/// Viewer or an `UNAUTHENTICATED` error carrying `message`
pub fn require_auth(ctx: &Context<'_>, message: &str) -> ServiceResult<Viewer> {
    match ctx.data_opt::<Claims>() {
        Some(claims) => Viewer::from_claims(claims),
        None => Err(ServiceError::unauthenticated(message)),
    }
}
