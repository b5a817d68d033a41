//! DataLoader implementations for reference fields
//!
//! Users, posts, comments and places reference each other by id. Resolving
//! those per parent would issue one query per row; the loaders collect the
//! ids requested while a response is being built and fetch them with a
//! single `$in` query per collection.

use async_graphql::dataloader::Loader;
use bson::oid::ObjectId;
use error_types::ServiceError;
use std::collections::HashMap;

use crate::models::{Comment, Place, Post, User};
use crate::store::Store;

/// Batches user lookups (authors, friends)
#[derive(Clone)]
pub struct UserLoader {
    store: Store,
}

impl UserLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Loader<ObjectId> for UserLoader {
    type Value = User;
    type Error = ServiceError;

    async fn load(&self, keys: &[ObjectId]) -> Result<HashMap<ObjectId, Self::Value>, Self::Error> {
        let users = self.store.users.find_by_ids(keys).await?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}

/// Batches post lookups for `User.posts`
#[derive(Clone)]
pub struct PostLoader {
    store: Store,
}

impl PostLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Loader<ObjectId> for PostLoader {
    type Value = Post;
    type Error = ServiceError;

    async fn load(&self, keys: &[ObjectId]) -> Result<HashMap<ObjectId, Self::Value>, Self::Error> {
        let posts = self.store.posts.find_by_ids(keys).await?;
        Ok(posts.into_iter().map(|post| (post.id, post)).collect())
    }
}

/// Batches comment lookups for `Post.comments`
#[derive(Clone)]
pub struct CommentLoader {
    store: Store,
}

impl CommentLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Loader<ObjectId> for CommentLoader {
    type Value = Comment;
    type Error = ServiceError;

    async fn load(&self, keys: &[ObjectId]) -> Result<HashMap<ObjectId, Self::Value>, Self::Error> {
        let comments = self.store.comments.find_by_ids(keys).await?;
        Ok(comments
            .into_iter()
            .map(|comment| (comment.id, comment))
            .collect())
    }
}

/// Batches place lookups for `User.savedPlaces`
#[derive(Clone)]
pub struct PlaceLoader {
    store: Store,
}

impl PlaceLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Loader<ObjectId> for PlaceLoader {
    type Value = Place;
    type Error = ServiceError;

    async fn load(&self, keys: &[ObjectId]) -> Result<HashMap<ObjectId, Self::Value>, Self::Error> {
        let places = self.store.places.find_by_ids(keys).await?;
        Ok(places.into_iter().map(|place| (place.id, place)).collect())
    }
}

/// Values for `ids` in the same order; dangling references are dropped
pub fn in_id_order<T: Clone>(ids: &[ObjectId], found: &HashMap<ObjectId, T>) -> Vec<T> {
    ids.iter().filter_map(|id| found.get(id).cloned()).collect()
}
