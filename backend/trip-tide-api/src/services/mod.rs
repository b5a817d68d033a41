//! Business rules behind the GraphQL operations
//!
//! Authorization (who may touch what) is decided here; resolvers only make
//! sure a viewer is present when an operation needs one.

pub mod accounts;
pub mod posts;
pub mod social;

use bson::oid::ObjectId;
use crypto_core::JwtKeys;
use error_types::{ServiceError, ServiceResult};
use std::sync::Arc;

use crate::store::Store;

pub use accounts::{AccountService, AuthPayload};
pub use posts::{PostService, POST_DELETED};
pub use social::SocialService;

/// Every service, built once and shared through the GraphQL context
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub posts: PostService,
    pub social: SocialService,
}

impl Services {
    pub fn new(store: Store, keys: Arc<JwtKeys>) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), keys),
            posts: PostService::new(store.clone()),
            social: SocialService::new(store),
        }
    }
}

/// Parse a client-supplied id; ids that cannot exist are reported as missing
pub(crate) fn parse_id(raw: &str, resource: &'static str) -> ServiceResult<ObjectId> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ServiceError::not_found(resource, raw))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::middleware::Viewer;
    use crate::models::NewUserInput;

    pub fn services() -> Services {
        Services::new(
            Store::in_memory(),
            Arc::new(JwtKeys::from_secret("test-secret", "trip-tide", 3600)),
        )
    }

    pub async fn register(services: &Services, username: &str) -> Viewer {
        let payload = services
            .accounts
            .register(NewUserInput {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "trav3ller".into(),
                location: None,
                description: None,
            })
            .await
            .expect("registration should succeed");

        Viewer {
            id: payload.user.id,
            username: payload.user.username,
            email: payload.user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex(), "Post").unwrap(), id);

        let err = parse_id("kyoto", "Post").unwrap_err();
        assert_eq!(err.to_string(), "Post not found");
    }
}
