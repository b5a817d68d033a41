use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::trim_in_place;

/// Comment document stored in the `comments` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub comment_body: String,
    pub username: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub post: ObjectId,
    pub author: ObjectId,
}

impl Comment {
    pub fn new(
        input: NewComment,
        post: ObjectId,
        author: ObjectId,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            comment_body: input.comment_body,
            username: username.into(),
            created_at: Utc::now(),
            post,
            author,
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, message = "You need to write a comment!"))]
    pub comment_body: String,
}

impl NewComment {
    pub fn normalize(mut self) -> Self {
        trim_in_place(&mut self.comment_body);
        self
    }
}
