//! In-memory repositories
//!
//! A single `RwLock` guards every collection so multi-document checks
//! (unique keys, add-to-set) are atomic, like one document update in MongoDB.

use bson::oid::ObjectId;
use error_types::{ServiceError, ServiceResult};
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::{
    CommentRepository, PlaceRepository, PostRepository, StoreHealth, UserRefList, UserRepository,
};
use crate::models::{Comment, Like, NewPlace, Place, Post, ProfileUpdate, User};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    places: Vec<Place>,
}

impl MemoryState {
    fn user_mut(&mut self, id: ObjectId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn post_mut(&mut self, id: ObjectId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    /// Unique username/email check, ignoring the user being updated
    fn check_unique_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<ObjectId>,
    ) -> ServiceResult<()> {
        let others = self.users.iter().filter(|u| Some(u.id) != except);
        for user in others {
            if username == Some(user.username.as_str()) {
                return Err(ServiceError::DuplicateKey {
                    field: "username".into(),
                });
            }
            if email == Some(user.email.as_str()) {
                return Err(ServiceError::DuplicateKey {
                    field: "email".into(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn select_by_ids<T: Clone>(
    items: &[T],
    ids: &[ObjectId],
    id_of: impl Fn(&T) -> ObjectId,
) -> Vec<T> {
    let wanted: HashSet<ObjectId> = ids.iter().copied().collect();
    items
        .iter()
        .filter(|item| wanted.contains(&id_of(item)))
        .cloned()
        .collect()
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        state.check_unique_user(Some(&user.username), Some(&user.email), None)?;
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(select_by_ids(&state.users, ids, |u| u.id))
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn update_profile(
        &self,
        id: ObjectId,
        update: &ProfileUpdate,
    ) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        state.check_unique_user(update.username.as_deref(), update.email.as_deref(), Some(id))?;

        Ok(state.user_mut(id).map(|user| {
            update.apply_to(user);
            user.clone()
        }))
    }

    async fn push_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.user_mut(id).map(|user| {
            list.select(user).push(value);
            user.clone()
        }))
    }

    async fn add_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.user_mut(id).map(|user| {
            let refs = list.select(user);
            if !refs.contains(&value) {
                refs.push(value);
            }
            user.clone()
        }))
    }

    async fn pull_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.user_mut(id).map(|user| {
            list.select(user).retain(|existing| *existing != value);
            user.clone()
        }))
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: &Post) -> ServiceResult<()> {
        self.state.write().await.posts.push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Post>> {
        let state = self.state.read().await;
        Ok(select_by_ids(&state.posts, ids, |p| p.id))
    }

    async fn list(&self, username: Option<&str>) -> ServiceResult<Vec<Post>> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| username.map_or(true, |name| p.username == name))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn delete(&self, id: ObjectId) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        Ok(state.posts.len() != before)
    }

    async fn push_comment(&self, id: ObjectId, comment: ObjectId) -> ServiceResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.post_mut(id).map(|post| {
            post.comments.push(comment);
            post.clone()
        }))
    }

    async fn pull_comment(&self, id: ObjectId, comment: ObjectId) -> ServiceResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.post_mut(id).map(|post| {
            post.comments.retain(|existing| *existing != comment);
            post.clone()
        }))
    }

    async fn add_like(&self, id: ObjectId, like: &Like) -> ServiceResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state
            .post_mut(id)
            .filter(|post| !post.is_liked_by(&like.username))
            .map(|post| {
                post.likes.push(like.clone());
                post.clone()
            }))
    }

    async fn remove_like(&self, id: ObjectId, username: &str) -> ServiceResult<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.post_mut(id).map(|post| {
            post.likes.retain(|like| like.username != username);
            post.clone()
        }))
    }
}

#[async_trait::async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: &Comment) -> ServiceResult<()> {
        self.state.write().await.comments.push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(select_by_ids(&state.comments, ids, |c| c.id))
    }

    async fn delete(&self, id: ObjectId) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(state.comments.len() != before)
    }

    async fn delete_by_post(&self, post: ObjectId) -> ServiceResult<u64> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.post != post);
        Ok((before - state.comments.len()) as u64)
    }
}

#[async_trait::async_trait]
impl PlaceRepository for InMemoryStore {
    async fn find_by_place_id(&self, place_id: &str) -> ServiceResult<Option<Place>> {
        let state = self.state.read().await;
        Ok(state.places.iter().find(|p| p.place_id == place_id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Place>> {
        let state = self.state.read().await;
        Ok(select_by_ids(&state.places, ids, |p| p.id))
    }

    async fn upsert(&self, place: &NewPlace) -> ServiceResult<Place> {
        let mut state = self.state.write().await;
        let fresh = Place::new(place.clone());

        match state.places.iter_mut().find(|p| p.place_id == place.place_id) {
            Some(existing) => {
                *existing = Place {
                    id: existing.id,
                    ..fresh
                };
                Ok(existing.clone())
            }
            None => {
                state.places.push(fresh.clone());
                Ok(fresh)
            }
        }
    }
}

#[async_trait::async_trait]
impl StoreHealth for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> ServiceResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewComment, NewPost, NewUserInput};

    fn user(username: &str, email: &str) -> User {
        User::new(
            NewUserInput {
                username: username.into(),
                email: email.into(),
                password: "trav3ller".into(),
                location: None,
                description: None,
            },
            "hash".into(),
        )
    }

    fn post(author: &User, title: &str) -> Post {
        Post::new(
            NewPost {
                post_title: title.into(),
                post_text: "Notes from the road".into(),
            },
            author.id,
            author.username.clone(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_rejected() {
        let store = InMemoryStore::new();
        UserRepository::create(&store, &user("wanderer", "w@example.com"))
            .await
            .unwrap();

        let err = UserRepository::create(&store, &user("wanderer", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateKey { ref field } if field == "username"));

        let err = UserRepository::create(&store, &user("nomad", "w@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateKey { ref field } if field == "email"));
    }

    #[tokio::test]
    async fn test_profile_update_checks_uniqueness_against_others_only() {
        let store = InMemoryStore::new();
        let wanderer = user("wanderer", "w@example.com");
        let nomad = user("nomad", "n@example.com");
        UserRepository::create(&store, &wanderer).await.unwrap();
        UserRepository::create(&store, &nomad).await.unwrap();

        let same_name = ProfileUpdate {
            username: Some("wanderer".into()),
            ..Default::default()
        };
        assert!(store.update_profile(wanderer.id, &same_name).await.is_ok());

        let taken = ProfileUpdate {
            email: Some("n@example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_profile(wanderer.id, &taken).await,
            Err(ServiceError::DuplicateKey { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_ref_is_set_like_and_pull_removes_all() {
        let store = InMemoryStore::new();
        let wanderer = user("wanderer", "w@example.com");
        UserRepository::create(&store, &wanderer).await.unwrap();
        let friend = ObjectId::new();

        store.add_ref(wanderer.id, UserRefList::Friends, friend).await.unwrap();
        let updated = store
            .add_ref(wanderer.id, UserRefList::Friends, friend)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.friends, vec![friend]);

        store.push_ref(wanderer.id, UserRefList::Posts, friend).await.unwrap();
        store.push_ref(wanderer.id, UserRefList::Posts, friend).await.unwrap();
        let updated = store
            .pull_ref(wanderer.id, UserRefList::Posts, friend)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.posts.is_empty());

        let missing = store
            .add_ref(ObjectId::new(), UserRefList::Friends, friend)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_posts_listed_newest_first_and_filtered() {
        let store = InMemoryStore::new();
        let wanderer = user("wanderer", "w@example.com");
        let nomad = user("nomad", "n@example.com");

        let mut first = post(&wanderer, "Porto");
        first.created_at -= chrono::Duration::minutes(10);
        let second = post(&nomad, "Kyoto");
        let third = post(&wanderer, "Lima");
        for p in [&first, &second, &third] {
            PostRepository::create(&store, p).await.unwrap();
        }

        let all = PostRepository::list(&store, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.last().unwrap().id, first.id);

        let mine = PostRepository::list(&store, Some("wanderer")).await.unwrap();
        let titles: Vec<_> = mine.iter().map(|p| p.post_title.as_str()).collect();
        assert_eq!(titles, vec!["Lima", "Porto"]);
    }

    #[tokio::test]
    async fn test_like_added_once_and_removed() {
        let store = InMemoryStore::new();
        let wanderer = user("wanderer", "w@example.com");
        let p = post(&wanderer, "Porto");
        PostRepository::create(&store, &p).await.unwrap();

        let liked = store.add_like(p.id, &Like::new("nomad")).await.unwrap();
        assert_eq!(liked.unwrap().like_count(), 1);

        let again = store.add_like(p.id, &Like::new("nomad")).await.unwrap();
        assert!(again.is_none());

        let unliked = store.remove_like(p.id, "nomad").await.unwrap().unwrap();
        assert_eq!(unliked.like_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_comments_by_post() {
        let store = InMemoryStore::new();
        let wanderer = user("wanderer", "w@example.com");
        let p = post(&wanderer, "Porto");
        let other = ObjectId::new();

        for target in [p.id, p.id, other] {
            let comment = Comment::new(
                NewComment {
                    comment_body: "Lovely".into(),
                },
                target,
                wanderer.id,
                "wanderer",
            );
            CommentRepository::create(&store, &comment).await.unwrap();
        }

        assert_eq!(store.delete_by_post(p.id).await.unwrap(), 2);
        assert_eq!(store.state.read().await.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_place_upsert_keeps_identity() {
        let store = InMemoryStore::new();
        let entry = NewPlace {
            place_id: "belem-tower".into(),
            place_name: Some("Belem Tower".into()),
            description: None,
            rating: Some("4.5".into()),
            tags: None,
            thumbnail_url: None,
        };

        let created = store.upsert(&entry).await.unwrap();
        let refreshed = store
            .upsert(&NewPlace {
                rating: Some("4.7".into()),
                ..entry
            })
            .await
            .unwrap();

        assert_eq!(created.id, refreshed.id);
        assert_eq!(refreshed.rating.as_deref(), Some("4.7"));
        assert_eq!(
            store
                .find_by_place_id("belem-tower")
                .await
                .unwrap()
                .unwrap()
                .rating
                .as_deref(),
            Some("4.7")
        );
    }
}
