//! Posts, comments, likes and places

use async_graphql::{
    dataloader::DataLoader, Context, ErrorExtensions, Object, Result as GraphQLResult, ResultExt,
    ID,
};
use bson::oid::ObjectId;
use chrono::Utc;
use error_types::ServiceError;

use super::loaders::{in_id_order, CommentLoader, UserLoader};
use super::services;
use super::user::UserNode;
use crate::middleware::auth::{require_auth, LOGIN_REQUIRED};
use crate::models::relative_time::from_now;
use crate::models::{Comment, Like, NewComment, NewPost, Place, Post};

/// Resolve an author reference, failing if the account is gone
async fn load_author(ctx: &Context<'_>, author: ObjectId) -> GraphQLResult<UserNode> {
    let loader = ctx.data::<DataLoader<UserLoader>>()?;
    loader
        .load_one(author)
        .await
        .extend()?
        .map(UserNode)
        .ok_or_else(|| ServiceError::not_found("User", author.to_hex()).extend())
}

pub struct PostNode(pub Post);

#[Object(name = "Post")]
impl PostNode {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn post_title(&self) -> &str {
        &self.0.post_title
    }

    async fn post_text(&self) -> &str {
        &self.0.post_text
    }

    /// Relative, e.g. "5 minutes ago"
    async fn created_at(&self) -> String {
        from_now(self.0.created_at, Utc::now())
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn comments(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<CommentNode>> {
        let loader = ctx.data::<DataLoader<CommentLoader>>()?;
        let found = loader
            .load_many(self.0.comments.iter().copied())
            .await
            .extend()?;
        Ok(in_id_order(&self.0.comments, &found)
            .into_iter()
            .map(CommentNode)
            .collect())
    }

    async fn comment_count(&self) -> usize {
        self.0.comment_count()
    }

    async fn likes(&self) -> Vec<LikeNode> {
        self.0.likes.iter().cloned().map(LikeNode).collect()
    }

    async fn like_count(&self) -> usize {
        self.0.like_count()
    }

    async fn author(&self, ctx: &Context<'_>) -> GraphQLResult<UserNode> {
        load_author(ctx, self.0.author).await
    }
}

pub struct CommentNode(pub Comment);

#[Object(name = "Comment")]
impl CommentNode {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn comment_body(&self) -> &str {
        &self.0.comment_body
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn created_at(&self) -> String {
        from_now(self.0.created_at, Utc::now())
    }

    async fn author(&self, ctx: &Context<'_>) -> GraphQLResult<UserNode> {
        load_author(ctx, self.0.author).await
    }
}

pub struct LikeNode(pub Like);

#[Object(name = "Like")]
impl LikeNode {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn created_at(&self) -> String {
        from_now(self.0.created_at, Utc::now())
    }
}

pub struct PlaceNode(pub Place);

#[Object(name = "Place")]
impl PlaceNode {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn place_id(&self) -> &str {
        &self.0.place_id
    }

    async fn place_name(&self) -> Option<&str> {
        self.0.place_name.as_deref()
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn rating(&self) -> Option<&str> {
        self.0.rating.as_deref()
    }

    async fn tags(&self) -> Option<&str> {
        self.0.tags.as_deref()
    }

    #[graphql(name = "thumbnail_url")]
    async fn thumbnail_url(&self) -> Option<&str> {
        self.0.thumbnail_url.as_deref()
    }
}

#[derive(Default)]
pub struct ContentQuery;

#[Object]
impl ContentQuery {
    /// All posts, or one user's, newest first
    async fn posts(
        &self,
        ctx: &Context<'_>,
        username: Option<String>,
    ) -> GraphQLResult<Vec<PostNode>> {
        let posts = services(ctx)?
            .posts
            .list(username.as_deref())
            .await
            .extend()?;
        Ok(posts.into_iter().map(PostNode).collect())
    }

    async fn post(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "_id")] id: ID,
    ) -> GraphQLResult<PostNode> {
        let post = services(ctx)?.posts.get(id.as_str()).await.extend()?;
        Ok(PostNode(post))
    }
}

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    async fn add_post(
        &self,
        ctx: &Context<'_>,
        post_title: String,
        post_text: String,
    ) -> GraphQLResult<PostNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let post = services(ctx)?
            .posts
            .create(
                &viewer,
                NewPost {
                    post_title,
                    post_text,
                },
            )
            .await
            .extend()?;
        Ok(PostNode(post))
    }

    async fn delete_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<String> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let message = services(ctx)?
            .posts
            .delete(&viewer, post_id.as_str())
            .await
            .extend()?;
        Ok(message.to_string())
    }

    async fn add_comment(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        comment_body: String,
    ) -> GraphQLResult<PostNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let post = services(ctx)?
            .posts
            .add_comment(&viewer, post_id.as_str(), NewComment { comment_body })
            .await
            .extend()?;
        Ok(PostNode(post))
    }

    async fn delete_comment(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        comment_id: ID,
    ) -> GraphQLResult<PostNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let post = services(ctx)?
            .posts
            .delete_comment(&viewer, post_id.as_str(), comment_id.as_str())
            .await
            .extend()?;
        Ok(PostNode(post))
    }

    /// Toggle the viewer's like
    async fn like_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<PostNode> {
        let viewer = require_auth(ctx, LOGIN_REQUIRED).extend()?;
        let post = services(ctx)?
            .posts
            .toggle_like(&viewer, post_id.as_str())
            .await
            .extend()?;
        Ok(PostNode(post))
    }
}
