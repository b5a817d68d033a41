//! User schema and resolvers

use async_graphql::{
    dataloader::DataLoader, Context, Object, Result as GraphQLResult, ResultExt, ID,
};

use super::content::{PlaceNode, PostNode};
use super::loaders::{in_id_order, PlaceLoader, PostLoader, UserLoader};
use super::services;
use crate::middleware::auth::{require_auth, LOGIN_REQUIRED};
use crate::models::User;

/// Rejection for `me` without a viewer
const NOT_LOGGED_IN: &str = "Not logged in";

/// GraphQL view of a user; the password hash has no field
pub struct UserNode(pub User);

#[Object(name = "User")]
impl UserNode {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn location(&self) -> Option<&str> {
        self.0.location.as_deref()
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn avatar(&self) -> &str {
        &self.0.avatar
    }

    async fn friend_count(&self) -> usize {
        self.0.friend_count()
    }

    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PostNode>> {
        let loader = ctx.data::<DataLoader<PostLoader>>()?;
        let found = loader.load_many(self.0.posts.iter().copied()).await.extend()?;
        Ok(in_id_order(&self.0.posts, &found)
            .into_iter()
            .map(PostNode)
            .collect())
    }

    async fn friends(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<UserNode>> {
        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let found = loader
            .load_many(self.0.friends.iter().copied())
            .await
            .extend()?;
        Ok(in_id_order(&self.0.friends, &found)
            .into_iter()
            .map(UserNode)
            .collect())
    }

    async fn saved_places(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PlaceNode>> {
        let loader = ctx.data::<DataLoader<PlaceLoader>>()?;
        let found = loader
            .load_many(self.0.saved_places.iter().copied())
            .await
            .extend()?;
        Ok(in_id_order(&self.0.saved_places, &found)
            .into_iter()
            .map(PlaceNode)
            .collect())
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The logged-in user
    async fn me(&self, ctx: &Context<'_>) -> GraphQLResult<UserNode> {
        let viewer = require_auth(ctx, NOT_LOGGED_IN).extend()?;
        let user = services(ctx)?.accounts.me(&viewer).await.extend()?;
        Ok(UserNode(user))
    }

    async fn users(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<UserNode>> {
        let users = services(ctx)?.accounts.list_users().await.extend()?;
        Ok(users.into_iter().map(UserNode).collect())
    }

    async fn user(&self, ctx: &Context<'_>, username: String) -> GraphQLResult<Option<UserNode>> {
        let user = services(ctx)?
            .accounts
            .find_by_username(&username)
            .await
            .extend()?;
        Ok(user.map(UserNode))
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn add_friend(&self, ctx: &Context<'_>, friend_id: ID) -> GraphQLResult<UserNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let user = services(ctx)?
            .social
            .add_friend(&viewer, friend_id.as_str())
            .await
            .extend()?;
        Ok(UserNode(user))
    }

    async fn remove_friend(&self, ctx: &Context<'_>, friend_id: ID) -> GraphQLResult<UserNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let user = services(ctx)?
            .social
            .remove_friend(&viewer, friend_id.as_str())
            .await
            .extend()?;
        Ok(UserNode(user))
    }

    /// Save a place by its catalogue id
    async fn save_place(&self, ctx: &Context<'_>, place_id: String) -> GraphQLResult<UserNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let user = services(ctx)?
            .social
            .save_place(&viewer, &place_id)
            .await
            .extend()?;
        Ok(UserNode(user))
    }

    async fn remove_place(&self, ctx: &Context<'_>, place_id: String) -> GraphQLResult<UserNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let user = services(ctx)?
            .social
            .remove_place(&viewer, &place_id)
            .await
            .extend()?;
        Ok(UserNode(user))
    }
}
