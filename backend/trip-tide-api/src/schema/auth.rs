//! Authentication schema and resolvers

use async_graphql::{Context, InputObject, Object, Result as GraphQLResult, ResultExt, ID};

use super::services;
use super::user::UserNode;
use crate::middleware::auth::{require_auth, LOGIN_REQUIRED};
use crate::models::{NewUserInput, ProfileUpdate};
use crate::services::AuthPayload;

/// Token plus the account it belongs to
pub struct AuthNode(pub AuthPayload);

#[Object(name = "Auth")]
impl AuthNode {
    async fn token(&self) -> ID {
        ID(self.0.token.clone())
    }

    async fn user(&self) -> UserNode {
        UserNode(self.0.user.clone())
    }
}

/// Profile fields `updateUser` may change; omitted fields stay as they are
#[derive(InputObject, Debug, Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateUserInput> for ProfileUpdate {
    fn from(input: UpdateUserInput) -> Self {
        ProfileUpdate {
            username: input.username,
            email: input.email,
            password: input.password,
            location: input.location,
            avatar: input.avatar,
            description: input.description,
        }
    }
}

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> GraphQLResult<AuthNode> {
        let payload = services(ctx)?
            .accounts
            .login(&email, &password)
            .await
            .extend()?;
        Ok(AuthNode(payload))
    }

    /// Register and log in
    async fn add_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
        location: Option<String>,
        description: Option<String>,
    ) -> GraphQLResult<AuthNode> {
        let payload = services(ctx)?
            .accounts
            .register(NewUserInput {
                username,
                email,
                password,
                location,
                description,
            })
            .await
            .extend()?;
        Ok(AuthNode(payload))
    }

    /// Change the viewer's own profile; returns a token reflecting the change
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        input: UpdateUserInput,
        user_id: ID,
    ) -> GraphQLResult<AuthNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let payload = services(ctx)?
            .accounts
            .update_profile(&viewer, user_id.as_str(), input.into())
            .await
            .extend()?;
        Ok(AuthNode(payload))
    }
}
