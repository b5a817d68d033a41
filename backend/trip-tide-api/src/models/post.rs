use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::trim_in_place;

/// Post document stored in the `posts` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub post_title: String,
    pub post_text: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Author's username at the time of posting
    pub username: String,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    #[serde(default)]
    pub likes: Vec<Like>,
    pub author: ObjectId,
}

impl Post {
    pub fn new(input: NewPost, author: ObjectId, username: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            post_title: input.post_title,
            post_text: input.post_text,
            created_at: Utc::now(),
            username: username.into(),
            comments: Vec::new(),
            likes: Vec::new(),
            author,
        }
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, username: &str) -> bool {
        self.likes.iter().any(|like| like.username == username)
    }
}

/// Like embedded in a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

/// Arguments of the `addPost` mutation
#[derive(Debug, Clone, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, message = "You need to write a title!"))]
    pub post_title: String,

    #[validate(length(min = 1, message = "You need to write something!"))]
    pub post_text: String,
}

impl NewPost {
    pub fn normalize(mut self) -> Self {
        trim_in_place(&mut self.post_title);
        trim_in_place(&mut self.post_text);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_rejected_with_message() {
        let input = NewPost {
            post_title: "   ".into(),
            post_text: "Sunrise over the Douro".into(),
        }
        .normalize();

        let errors = input.validate().unwrap_err();
        let title = errors.field_errors()["post_title"];
        assert_eq!(title[0].message.as_deref(), Some("You need to write a title!"));
    }

    #[test]
    fn test_blank_text_rejected_with_message() {
        let input = NewPost {
            post_title: "Porto".into(),
            post_text: "".into(),
        };

        let errors = input.validate().unwrap_err();
        let text = errors.field_errors()["post_text"];
        assert_eq!(text[0].message.as_deref(), Some("You need to write something!"));
    }

    #[test]
    fn test_counts_and_likes() {
        let author = ObjectId::new();
        let mut post = Post::new(
            NewPost {
                post_title: "Porto".into(),
                post_text: "Sunrise over the Douro".into(),
            },
            author,
            "wanderer",
        );
        assert_eq!(post.like_count(), 0);
        assert_eq!(post.comment_count(), 0);

        post.likes.push(Like::new("nomad"));
        post.comments.push(ObjectId::new());
        assert!(post.is_liked_by("nomad"));
        assert!(!post.is_liked_by("wanderer"));
        assert_eq!(post.like_count(), 1);
        assert_eq!(post.comment_count(), 1);
    }

    #[test]
    fn test_created_at_stored_as_bson_datetime() {
        let post = Post::new(
            NewPost {
                post_title: "Porto".into(),
                post_text: "Sunrise".into(),
            },
            ObjectId::new(),
            "wanderer",
        );
        let document = bson::to_document(&post).unwrap();
        assert!(document.get_datetime("createdAt").is_ok());
        assert!(document.contains_key("postTitle"));
    }
}
