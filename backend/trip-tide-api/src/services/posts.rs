use error_types::{ServiceError, ServiceResult};
use tracing::{debug, info, warn};

use super::parse_id;
use crate::middleware::Viewer;
use crate::models::validation::validate_input;
use crate::models::{Comment, Like, NewComment, NewPost, Post};
use crate::store::{Store, UserRefList};

/// Result message of `deletePost`
pub const POST_DELETED: &str = "Post successfully deleted";

const NO_PERMISSION: &str = "You do not have permission to do that";

/// Posts, their comments and likes
#[derive(Clone)]
pub struct PostService {
    store: Store,
}

impl PostService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Newest first, optionally limited to one author
    pub async fn list(&self, username: Option<&str>) -> ServiceResult<Vec<Post>> {
        let username = username.map(str::trim).filter(|name| !name.is_empty());
        self.store.posts.list(username).await
    }

    pub async fn get(&self, post_id: &str) -> ServiceResult<Post> {
        let id = parse_id(post_id, "Post")?;
        self.store
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post", post_id))
    }

    pub async fn create(&self, viewer: &Viewer, input: NewPost) -> ServiceResult<Post> {
        let input = input.normalize();
        validate_input(&input)?;

        let post = Post::new(input, viewer.id, viewer.username.clone());
        self.store.posts.create(&post).await?;

        if self
            .store
            .users
            .push_ref(viewer.id, UserRefList::Posts, post.id)
            .await?
            .is_none()
        {
            warn!(user_id = %viewer.id, post_id = %post.id, "Post author no longer exists");
        }

        info!(post_id = %post.id, user_id = %viewer.id, "Post created");
        Ok(post)
    }

    /// Remove a post owned by the viewer together with its comments
    pub async fn delete(&self, viewer: &Viewer, post_id: &str) -> ServiceResult<&'static str> {
        let post = self.get(post_id).await?;
        if post.author != viewer.id {
            return Err(ServiceError::forbidden(NO_PERMISSION));
        }

        if !self.store.posts.delete(post.id).await? {
            return Err(ServiceError::not_found("Post", post_id));
        }
        let removed_comments = self.store.comments.delete_by_post(post.id).await?;
        self.store
            .users
            .pull_ref(post.author, UserRefList::Posts, post.id)
            .await?;

        info!(
            post_id = %post.id,
            removed_comments,
            "Post deleted"
        );
        Ok(POST_DELETED)
    }

    /// Comment on a post and return the updated post
    pub async fn add_comment(
        &self,
        viewer: &Viewer,
        post_id: &str,
        input: NewComment,
    ) -> ServiceResult<Post> {
        let input = input.normalize();
        validate_input(&input)?;

        let post = self.get(post_id).await?;
        let comment = Comment::new(input, post.id, viewer.id, viewer.username.clone());
        self.store.comments.create(&comment).await?;

        match self.store.posts.push_comment(post.id, comment.id).await? {
            Some(post) => {
                debug!(post_id = %post.id, comment_id = %comment.id, "Comment added");
                Ok(post)
            }
            None => {
                // post vanished between the lookup and the push
                self.store.comments.delete(comment.id).await?;
                Err(ServiceError::not_found("Post", post_id))
            }
        }
    }

    /// Delete the viewer's comment and return the updated post
    pub async fn delete_comment(
        &self,
        viewer: &Viewer,
        post_id: &str,
        comment_id: &str,
    ) -> ServiceResult<Post> {
        let post_oid = parse_id(post_id, "Post")?;
        let comment_oid = parse_id(comment_id, "Comment")?;

        let comment = self
            .store
            .comments
            .find_by_id(comment_oid)
            .await?
            .filter(|comment| comment.post == post_oid)
            .ok_or_else(|| ServiceError::not_found("Comment", comment_id))?;

        if comment.author != viewer.id {
            return Err(ServiceError::forbidden(NO_PERMISSION));
        }

        self.store.comments.delete(comment.id).await?;
        debug!(post_id = %post_oid, comment_id = %comment.id, "Comment deleted");

        self.store
            .posts
            .pull_comment(post_oid, comment.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post", post_id))
    }

    /// Like the post, or take the viewer's like back if already there
    pub async fn toggle_like(&self, viewer: &Viewer, post_id: &str) -> ServiceResult<Post> {
        let post = self.get(post_id).await?;

        let updated = if post.is_liked_by(&viewer.username) {
            self.store
                .posts
                .remove_like(post.id, &viewer.username)
                .await?
        } else {
            match self
                .store
                .posts
                .add_like(post.id, &Like::new(viewer.username.clone()))
                .await?
            {
                Some(post) => Some(post),
                // a concurrent request liked it first
                None => self.store.posts.find_by_id(post.id).await?,
            }
        };

        updated.ok_or_else(|| ServiceError::not_found("Post", post_id))
    }
}
