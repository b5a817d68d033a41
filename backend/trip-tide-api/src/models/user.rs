use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{trim_in_place, trim_optional};

/// Avatar assigned to accounts that never uploaded one
pub const DEFAULT_AVATAR: &str = "https://images.unsplash.com/photo-1620750034602-1ad42e46b86b?ixlib=rb-4.0.3&auto=format&fit=crop&w=735&q=80";

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

/// User document stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// Always lower-case
    pub email: String,
    /// Argon2 PHC string, never exposed through the API
    pub password: String,
    #[serde(default)]
    pub posts: Vec<ObjectId>,
    #[serde(default)]
    pub friends: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub saved_places: Vec<ObjectId>,
}

impl User {
    /// Build a fresh account from validated registration input
    pub fn new(input: NewUserInput, password_hash: String) -> Self {
        Self {
            id: ObjectId::new(),
            username: input.username,
            email: input.email,
            password: password_hash,
            posts: Vec::new(),
            friends: Vec::new(),
            location: input.location,
            description: input.description,
            avatar: default_avatar(),
            saved_places: Vec::new(),
        }
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }
}

/// Arguments of the `addUser` mutation
#[derive(Debug, Clone, Validate)]
pub struct NewUserInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(custom(function = "crate::models::validation::validate_email_shape"))]
    pub email: String,

    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,

    pub location: Option<String>,
    pub description: Option<String>,
}

impl NewUserInput {
    /// Trim text fields and lower-case the email; the password is kept verbatim
    pub fn normalize(mut self) -> Self {
        trim_in_place(&mut self.username);
        trim_in_place(&mut self.email);
        self.email = self.email.to_lowercase();
        self.location = trim_optional(self.location);
        self.description = trim_optional(self.description);
        self
    }
}

/// Partial profile change applied by `updateUser`
///
/// `None` leaves a field untouched. An empty `location` or `description`
/// clears it. By the time it reaches a repository the password, if any, has
/// already been replaced by its hash.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: Option<String>,

    #[validate(custom(function = "crate::models::validation::validate_email_shape"))]
    pub email: Option<String>,

    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: Option<String>,

    pub location: Option<String>,

    #[validate(custom(function = "crate::models::validation::validate_avatar_url"))]
    pub avatar: Option<String>,

    pub description: Option<String>,
}

impl ProfileUpdate {
    pub fn normalize(mut self) -> Self {
        self.username = self.username.map(|v| v.trim().to_string());
        self.email = self.email.map(|v| v.trim().to_lowercase());
        self.avatar = self.avatar.map(|v| v.trim().to_string());
        self.location = self.location.map(|v| v.trim().to_string());
        self.description = self.description.map(|v| v.trim().to_string());
        self
    }

    /// Apply the set fields onto a stored user
    pub fn apply_to(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
        if let Some(location) = &self.location {
            user.location = non_empty(location);
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = avatar.clone();
        }
        if let Some(description) = &self.description {
            user.description = non_empty(description);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
