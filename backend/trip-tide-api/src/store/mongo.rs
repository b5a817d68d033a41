//! MongoDB repositories
//!
//! Array mutations map one-to-one onto `$push`, `$addToSet` and `$pull`, and
//! every update reads back the post-image with `ReturnDocument::After`.

use bson::{doc, oid::ObjectId, Bson, Document};
use error_types::{ServiceError, ServiceResult};
use futures_util::TryStreamExt;
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use tracing::{debug, info};

use super::{
    CommentRepository, PlaceRepository, PostRepository, StoreHealth, UserRefList, UserRepository,
};
use crate::models::{Comment, Like, NewPlace, Place, Post, ProfileUpdate, User};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Profile fields an empty value removes
const PROFILE_CLEARABLE_FIELDS: [&str; 2] = ["location", "description"];

/// Optional place fields cleared when a seed entry no longer carries them
const PLACE_OPTIONAL_FIELDS: [&str; 5] =
    ["placeName", "description", "rating", "tags", "thumbnail_url"];

#[derive(Clone)]
pub struct MongoStore {
    database: Database,
    users: Collection<User>,
    posts: Collection<Post>,
    comments: Collection<Comment>,
    places: Collection<Place>,
}

impl MongoStore {
    pub fn new(database: Database) -> Self {
        Self {
            users: database.collection("users"),
            posts: database.collection("posts"),
            comments: database.collection("comments"),
            places: database.collection("places"),
            database,
        }
    }

    /// Create the unique and lookup indexes the repositories rely on
    pub async fn ensure_indexes(&self) -> ServiceResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users
            .create_indexes([
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique())
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
                IndexModel::builder().keys(doc! { "location": 1 }).build(),
            ])
            .await
            .map_err(map_mongo_error)?;

        self.posts
            .create_indexes([
                IndexModel::builder().keys(doc! { "username": 1 }).build(),
                IndexModel::builder().keys(doc! { "author": 1 }).build(),
                IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            ])
            .await
            .map_err(map_mongo_error)?;

        self.comments
            .create_indexes([
                IndexModel::builder().keys(doc! { "post": 1 }).build(),
                IndexModel::builder().keys(doc! { "author": 1 }).build(),
            ])
            .await
            .map_err(map_mongo_error)?;

        self.places
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "placeId": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(map_mongo_error)?;

        info!(database = %self.database.name(), "MongoDB indexes ensured");
        Ok(())
    }

    async fn update_user(&self, id: ObjectId, update: Document) -> ServiceResult<Option<User>> {
        self.users
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)
    }

    async fn update_post(&self, filter: Document, update: Document) -> ServiceResult<Option<Post>> {
        self.posts
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)
    }
}

/// `{ <operator>: { <field>: <value> } }`
fn array_update(operator: &str, field: &str, value: impl Into<Bson>) -> Document {
    let mut target = Document::new();
    target.insert(field, value);
    let mut update = Document::new();
    update.insert(operator, target);
    update
}

/// `$set` for the fields present in a profile update, `$unset` for cleared ones
fn profile_update(update: &ProfileUpdate) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();
    let fields = [
        ("username", &update.username),
        ("email", &update.email),
        ("password", &update.password),
        ("location", &update.location),
        ("avatar", &update.avatar),
        ("description", &update.description),
    ];
    for (key, value) in fields {
        match value.as_deref() {
            Some("") if PROFILE_CLEARABLE_FIELDS.contains(&key) => {
                unset.insert(key, "");
            }
            Some(value) => {
                set.insert(key, value);
            }
            None => {}
        }
    }

    let mut document = Document::new();
    if !set.is_empty() {
        document.insert("$set", set);
    }
    if !unset.is_empty() {
        document.insert("$unset", unset);
    }
    document
}

/// Upsert body refreshing every catalogue field while keeping `_id` stable
fn place_upsert(place: &NewPlace) -> ServiceResult<Document> {
    let fresh = Place::new(place.clone());
    let mut set = bson::to_document(&fresh).map_err(ServiceError::internal)?;
    set.remove("_id");

    let mut unset = Document::new();
    for field in PLACE_OPTIONAL_FIELDS {
        if !set.contains_key(field) {
            unset.insert(field, "");
        }
    }

    let mut update = doc! {
        "$set": set,
        "$setOnInsert": { "_id": fresh.id },
    };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    Ok(update)
}

/// Translate driver errors, recognising unique-index violations
pub(crate) fn map_mongo_error(error: MongoError) -> ServiceError {
    let duplicate = match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            Some(duplicate_field(&write.message))
        }
        ErrorKind::Command(command) if command.code == DUPLICATE_KEY_CODE => {
            Some(duplicate_field(&command.message))
        }
        _ => None,
    };

    match duplicate {
        Some(field) => {
            debug!(field = %field, "Unique index rejected write");
            ServiceError::DuplicateKey { field }
        }
        None => ServiceError::database(error),
    }
}

/// Field behind an E11000 message such as
/// `E11000 duplicate key error collection: trip-tide.users index: username_1 dup key: ...`
fn duplicate_field(message: &str) -> String {
    message
        .split_once("index: ")
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(|index| index.rsplit_once('_').map_or(index, |(field, _)| field))
        .filter(|field| !field.is_empty())
        .unwrap_or("value")
        .to_string()
}

#[async_trait::async_trait]
impl UserRepository for MongoStore {
    async fn create(&self, user: &User) -> ServiceResult<()> {
        self.users.insert_one(user).await.map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<User>> {
        self.users
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<User>> {
        self.users
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        self.users
            .find_one(doc! { "username": username })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(map_mongo_error)
    }

    async fn list(&self) -> ServiceResult<Vec<User>> {
        self.users
            .find(doc! {})
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }

    async fn update_profile(
        &self,
        id: ObjectId,
        update: &ProfileUpdate,
    ) -> ServiceResult<Option<User>> {
        let document = profile_update(update);
        if document.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }
        self.update_user(id, document).await
    }

    async fn push_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>> {
        self.update_user(id, array_update("$push", list.field(), value))
            .await
    }

    async fn add_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>> {
        self.update_user(id, array_update("$addToSet", list.field(), value))
            .await
    }

    async fn pull_ref(
        &self,
        id: ObjectId,
        list: UserRefList,
        value: ObjectId,
    ) -> ServiceResult<Option<User>> {
        self.update_user(id, array_update("$pull", list.field(), value))
            .await
    }
}

#[async_trait::async_trait]
impl PostRepository for MongoStore {
    async fn create(&self, post: &Post) -> ServiceResult<()> {
        self.posts.insert_one(post).await.map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<Post>> {
        self.posts
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Post>> {
        self.posts
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }

    async fn list(&self, username: Option<&str>) -> ServiceResult<Vec<Post>> {
        let filter = match username {
            Some(username) => doc! { "username": username },
            None => doc! {},
        };

        self.posts
            .find(filter)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }

    async fn delete(&self, id: ObjectId) -> ServiceResult<bool> {
        let result = self
            .posts
            .delete_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn push_comment(&self, id: ObjectId, comment: ObjectId) -> ServiceResult<Option<Post>> {
        self.update_post(doc! { "_id": id }, doc! { "$push": { "comments": comment } })
            .await
    }

    async fn pull_comment(&self, id: ObjectId, comment: ObjectId) -> ServiceResult<Option<Post>> {
        self.update_post(doc! { "_id": id }, doc! { "$pull": { "comments": comment } })
            .await
    }

    async fn add_like(&self, id: ObjectId, like: &Like) -> ServiceResult<Option<Post>> {
        let like_doc = bson::to_bson(like).map_err(ServiceError::internal)?;
        self.update_post(
            doc! { "_id": id, "likes.username": { "$ne": like.username.as_str() } },
            doc! { "$push": { "likes": like_doc } },
        )
        .await
    }

    async fn remove_like(&self, id: ObjectId, username: &str) -> ServiceResult<Option<Post>> {
        self.update_post(
            doc! { "_id": id },
            doc! { "$pull": { "likes": { "username": username } } },
        )
        .await
    }
}

#[async_trait::async_trait]
impl CommentRepository for MongoStore {
    async fn create(&self, comment: &Comment) -> ServiceResult<()> {
        self.comments
            .insert_one(comment)
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> ServiceResult<Option<Comment>> {
        self.comments
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Comment>> {
        self.comments
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }

    async fn delete(&self, id: ObjectId) -> ServiceResult<bool> {
        let result = self
            .comments
            .delete_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_post(&self, post: ObjectId) -> ServiceResult<u64> {
        let result = self
            .comments
            .delete_many(doc! { "post": post })
            .await
            .map_err(map_mongo_error)?;
        Ok(result.deleted_count)
    }
}

#[async_trait::async_trait]
impl PlaceRepository for MongoStore {
    async fn find_by_place_id(&self, place_id: &str) -> ServiceResult<Option<Place>> {
        self.places
            .find_one(doc! { "placeId": place_id })
            .await
            .map_err(map_mongo_error)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> ServiceResult<Vec<Place>> {
        self.places
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)
    }

    async fn upsert(&self, place: &NewPlace) -> ServiceResult<Place> {
        let update = place_upsert(place)?;

        self.places
            .find_one_and_update(doc! { "placeId": place.place_id.as_str() }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?
            .ok_or_else(|| ServiceError::internal("upsert returned no document"))
    }
}

#[async_trait::async_trait]
impl StoreHealth for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> ServiceResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(ServiceError::database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_from_server_message() {
        let message = r#"E11000 duplicate key error collection: trip-tide.users index: username_1 dup key: { username: "wanderer" }"#;
        assert_eq!(duplicate_field(message), "username");

        let message = "E11000 duplicate key error collection: trip-tide.places index: placeId_1 dup key: { placeId: \"belem\" }";
        assert_eq!(duplicate_field(message), "placeId");

        assert_eq!(duplicate_field("E11000 duplicate key error"), "value");
    }

    #[test]
    fn test_array_update_shape() {
        let friend = ObjectId::new();
        let update = array_update("$addToSet", UserRefList::Friends.field(), friend);
        assert_eq!(update, doc! { "$addToSet": { "friends": friend } });
    }

    #[test]
    fn test_profile_update_only_includes_present_fields() {
        let update = ProfileUpdate {
            email: Some("new@example.org".into()),
            location: Some("Hanoi".into()),
            ..Default::default()
        };
        assert_eq!(
            profile_update(&update),
            doc! { "$set": { "email": "new@example.org", "location": "Hanoi" } }
        );
        assert!(profile_update(&ProfileUpdate::default()).is_empty());
    }

    #[test]
    fn test_profile_update_unsets_cleared_fields() {
        let update = ProfileUpdate {
            location: Some(String::new()),
            description: Some(String::new()),
            avatar: Some("https://cdn.example.com/me.png".into()),
            ..Default::default()
        };
        assert_eq!(
            profile_update(&update),
            doc! {
                "$set": { "avatar": "https://cdn.example.com/me.png" },
                "$unset": { "location": "", "description": "" },
            }
        );
    }

    #[test]
    fn test_place_upsert_unsets_missing_fields() {
        let place = NewPlace {
            place_id: "belem-tower".into(),
            place_name: Some("Belem Tower".into()),
            description: None,
            rating: Some("4.6".into()),
            tags: None,
            thumbnail_url: None,
        };

        let update = place_upsert(&place).unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("placeId").unwrap(), "belem-tower");
        assert!(!set.contains_key("_id"));

        let unset = update.get_document("$unset").unwrap();
        let cleared: Vec<&str> = unset.keys().map(String::as_str).collect();
        assert_eq!(cleared, vec!["description", "tags", "thumbnail_url"]);
        assert!(update.get_document("$setOnInsert").unwrap().contains_key("_id"));
    }
}
