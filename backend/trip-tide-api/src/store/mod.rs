//! Persistence layer
//!
//! Services talk to the repository traits only. [`MongoStore`] backs
//! production; [`InMemoryStore`] keeps the same semantics (unique keys,
//! set-style array updates, newest-first ordering) for tests and local runs.

pub mod memory;
pub mod mongo;

use bson::oid::ObjectId;
use error_types::ServiceResult;
use std::sync::Arc;

use crate::models::{Comment, Like, NewPlace, Place, Post, ProfileUpdate, User};

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

/// Reference arrays held on a user document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRefList {
    Posts,
    Friends,
    SavedPlaces,
}

impl UserRefList {
    /// Document field name
    pub fn field(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Friends => "friends",
            Self::SavedPlaces => "savedPlaces",
        }
    }

    pub(crate) fn select(self, user: &mut User) -> &mut Vec<ObjectId> {
        match self {
            Self::Posts => &mut user.posts,
            Self::Friends => &mut user.friends,
            Self::SavedPlaces => &mut user.saved_places,
        }
    }
}

/// Update operations return the document after the change, or `None` when
/// the target does not exist.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; username and email must be unique
    async fn create(&self, user: &User) -> ServiceResult<()>;

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<User>>;

    /// Batch lookup; missing ids are skipped and order is unspecified
    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<User>>;

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    /// Exact match on the stored (lower-cased) email
    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>>;

    async fn list(&self) -> ServiceResult<Vec<User>>;

    /// Set the given profile fields
    async fn update_profile(&self, id: ObjectId, update: &ProfileUpdate)
        -> ServiceResult<Option<User>>;

    /// Append, allowing duplicates
    async fn push_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>>;

    /// Append unless already present
    async fn add_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>>;

    /// Remove every occurrence
    async fn pull_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>>;
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> ServiceResult<()>;

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<Post>>;

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Post>>;

    /// All posts, or those written under `username`, newest first
    async fn list(&self, username: Option<&str>) -> ServiceResult<Vec<Post>>;

    /// Returns whether a post was removed
    async fn delete(&self, id: ObjectId) -> ServiceResult<bool>;

    async fn push_comment(&self, id: ObjectId, comment: ObjectId) -> ServiceResult<Option<Post>>;

    async fn pull_comment(&self, id: ObjectId, comment: ObjectId) -> ServiceResult<Option<Post>>;

    /// Add `like` unless its username already liked the post.
    /// `None` means the post is missing or the like already exists.
    async fn add_like(&self, id: ObjectId, like: &Like) -> ServiceResult<Option<Post>>;

    /// Remove every like left by `username`
    async fn remove_like(&self, id: ObjectId, username: &str) -> ServiceResult<Option<Post>>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> ServiceResult<()>;

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<Comment>>;

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Comment>>;

    async fn delete(&self, id: ObjectId) -> ServiceResult<bool>;

    /// Remove all comments on a post, returning how many went
    async fn delete_by_post(&self, post: ObjectId) -> ServiceResult<u64>;
}

#[async_trait::async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Lookup by external catalogue id
    async fn find_by_place_id(&self, place_id: &str) -> ServiceResult<Option<Place>>;

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Place>>;

    /// Insert or refresh a catalogue entry keyed by `place_id`
    async fn upsert(&self, place: &NewPlace) -> ServiceResult<Place>;
}

/// Liveness of the backing database
#[async_trait::async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> ServiceResult<()>;
}

/// Shared handle to every repository
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub places: Arc<dyn PlaceRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Store {
    /// Process-local store; contents vanish on restart
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryStore::new()))
    }

    /// MongoDB-backed store; ensures indexes before returning
    pub async fn mongo(database: mongodb::Database) -> ServiceResult<Self> {
        let store = MongoStore::new(database);
        store.ensure_indexes().await?;
        Ok(Self::from_backend(Arc::new(store)))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository
            + PostRepository
            + CommentRepository
            + PlaceRepository
            + StoreHealth
            + 'static,
    {
        Self {
            users: backend.clone(),
            posts: backend.clone(),
            comments: backend.clone(),
            places: backend.clone(),
            health: backend,
        }
    }
}
