//! Document models and validated inputs

pub mod comment;
pub mod place;
pub mod post;
pub mod relative_time;
pub mod user;
pub mod validation;

pub use comment::{Comment, NewComment};
pub use place::{NewPlace, Place};
pub use post::{Like, NewPost, Post};
pub use user::{NewUserInput, ProfileUpdate, User, DEFAULT_AVATAR};
