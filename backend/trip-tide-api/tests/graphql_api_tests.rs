//! End-to-end GraphQL flows against the in-memory store
//!
//! Requests carry validated `Claims` exactly as the HTTP handler forwards
//! them from the JWT middleware.

use async_graphql::{Request, Response, Variables};
use crypto_core::JwtKeys;
use serde_json::{json, Value};
use std::sync::Arc;

use trip_tide_api::config::GraphQLConfig;
use trip_tide_api::models::{NewPlace, DEFAULT_AVATAR};
use trip_tide_api::schema::{build_schema, AppSchema};
use trip_tide_api::services::Services;
use trip_tide_api::store::Store;

// ============================================================================
// TEST UTILITIES & FIXTURES
// ============================================================================

struct Harness {
    schema: AppSchema,
    store: Store,
    keys: Arc<JwtKeys>,
}

struct Account {
    id: String,
    token: String,
}

impl Harness {
    fn new() -> Self {
        let store = Store::in_memory();
        let keys = Arc::new(JwtKeys::from_secret("integration-secret", "trip-tide", 3600));
        let schema = build_schema(
            Services::new(store.clone(), keys.clone()),
            store.clone(),
            &GraphQLConfig::default(),
        );
        Self {
            schema,
            store,
            keys,
        }
    }

    async fn run(&self, query: &str, variables: Value, token: Option<&str>) -> Response {
        let mut request = Request::new(query).variables(Variables::from_json(variables));
        if let Some(token) = token {
            let claims = self.keys.validate_token(token).expect("test token is valid");
            request = request.data(claims);
        }
        self.schema.execute(request).await
    }

    async fn sign_up(&self, username: &str) -> Account {
        let response = self
            .run(
                r#"mutation($username: String!, $email: String!) {
                    addUser(username: $username, email: $email, password: "trav3ller") {
                        token
                        user { _id }
                    }
                }"#,
                json!({ "username": username, "email": format!("{}@example.com", username) }),
                None,
            )
            .await;
        let data = data(response);
        Account {
            id: data["addUser"]["user"]["_id"].as_str().unwrap().to_string(),
            token: data["addUser"]["token"].as_str().unwrap().to_string(),
        }
    }

    async fn add_post(&self, account: &Account, title: &str) -> String {
        let response = self
            .run(
                r#"mutation($title: String!) {
                    addPost(postTitle: $title, postText: "Notes from the road") { _id }
                }"#,
                json!({ "title": title }),
                Some(&account.token),
            )
            .await;
        data(response)["addPost"]["_id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

fn data(response: Response) -> Value {
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().unwrap()
}

fn first_error(response: &Response) -> (String, Option<String>) {
    let error = response.errors.first().expect("expected an error");
    let code = error
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .and_then(|code| match code {
            async_graphql::Value::String(code) => Some(code.clone()),
            _ => None,
        });
    (error.message.clone(), code)
}

// ============================================================================
// ACCOUNTS
// ============================================================================

#[tokio::test]
async fn test_sign_up_then_me() {
    let harness = Harness::new();
    let account = harness.sign_up("wanderer").await;

    let response = harness
        .run(
            "{ me { _id username email avatar friendCount posts { _id } savedPlaces { _id } } }",
            json!({}),
            Some(&account.token),
        )
        .await;
    let me = &data(response)["me"];

    assert_eq!(me["_id"], account.id.as_str());
    assert_eq!(me["username"], "wanderer");
    assert_eq!(me["email"], "wanderer@example.com");
    assert_eq!(me["avatar"], DEFAULT_AVATAR);
    assert_eq!(me["friendCount"], 0);
    assert_eq!(me["posts"], json!([]));
}

#[tokio::test]
async fn test_me_requires_login() {
    let harness = Harness::new();
    let response = harness.run("{ me { username } }", json!({}), None).await;

    let (message, code) = first_error(&response);
    assert_eq!(message, "Not logged in");
    assert_eq!(code.as_deref(), Some("UNAUTHENTICATED"));
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let harness = Harness::new();
    harness.sign_up("wanderer").await;

    let response = harness
        .run(
            r#"mutation {
                addUser(username: "wanderer", email: "other@example.com", password: "trav3ller") { token }
            }"#,
            json!({}),
            None,
        )
        .await;

    let (_, code) = first_error(&response);
    assert_eq!(code.as_deref(), Some("DUPLICATE_KEY"));
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let harness = Harness::new();
    harness.sign_up("wanderer").await;

    let response = harness
        .run(
            r#"mutation { login(email: "wanderer@example.com", password: "nope!") { token } }"#,
            json!({}),
            None,
        )
        .await;
    let (message, code) = first_error(&response);
    assert_eq!(message, "Incorrect credentials");
    assert_eq!(code.as_deref(), Some("UNAUTHENTICATED"));

    let response = harness
        .run(
            r#"mutation { login(email: "Wanderer@Example.com", password: "trav3ller") { token user { username } } }"#,
            json!({}),
            None,
        )
        .await;
    assert_eq!(data(response)["login"]["user"]["username"], "wanderer");
}

#[tokio::test]
async fn test_update_user_only_for_self() {
    let harness = Harness::new();
    let wanderer = harness.sign_up("wanderer").await;
    let nomad = harness.sign_up("nomad").await;

    let mutation = r#"mutation($id: ID!, $input: UpdateUserInput!) {
        updateUser(userId: $id, input: $input) { token user { username location } }
    }"#;

    let response = harness
        .run(
            mutation,
            json!({ "id": wanderer.id, "input": { "location": "Hanoi" } }),
            Some(&nomad.token),
        )
        .await;
    let (message, code) = first_error(&response);
    assert_eq!(message, "You do not have permission to do that");
    assert_eq!(code.as_deref(), Some("FORBIDDEN"));

    let response = harness
        .run(
            mutation,
            json!({ "id": wanderer.id, "input": { "username": "roamer", "location": "Hanoi" } }),
            Some(&wanderer.token),
        )
        .await;
    let updated = &data(response)["updateUser"];
    assert_eq!(updated["user"]["username"], "roamer");
    assert_eq!(updated["user"]["location"], "Hanoi");

    let claims = harness
        .keys
        .validate_token(updated["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.username, "roamer");
}

// ============================================================================
// POSTS, COMMENTS, LIKES
// ============================================================================

#[tokio::test]
async fn test_add_post_requires_login_and_valid_title() {
    let harness = Harness::new();
    let response = harness
        .run(
            r#"mutation { addPost(postTitle: "Porto", postText: "Sunrise") { _id } }"#,
            json!({}),
            None,
        )
        .await;
    let (message, code) = first_error(&response);
    assert_eq!(message, "You need to be logged in");
    assert_eq!(code.as_deref(), Some("UNAUTHENTICATED"));

    let account = harness.sign_up("wanderer").await;
    let response = harness
        .run(
            r#"mutation { addPost(postTitle: "  ", postText: "Sunrise") { _id } }"#,
            json!({}),
            Some(&account.token),
        )
        .await;
    let (message, code) = first_error(&response);
    assert_eq!(message, "You need to write a title!");
    assert_eq!(code.as_deref(), Some("BAD_USER_INPUT"));
}

#[tokio::test]
async fn test_post_lifecycle() {
    let harness = Harness::new();
    let wanderer = harness.sign_up("wanderer").await;
    let nomad = harness.sign_up("nomad").await;
    let post_id = harness.add_post(&wanderer, "Porto").await;

    let response = harness
        .run(
            r#"mutation($id: ID!) {
                addComment(postId: $id, commentBody: "Great view!") {
                    commentCount
                    comments { commentBody username createdAt author { username } }
                }
            }"#,
            json!({ "id": post_id }),
            Some(&nomad.token),
        )
        .await;
    let post = &data(response)["addComment"];
    assert_eq!(post["commentCount"], 1);
    assert_eq!(post["comments"][0]["commentBody"], "Great view!");
    assert_eq!(post["comments"][0]["author"]["username"], "nomad");
    assert_eq!(post["comments"][0]["createdAt"], "a few seconds ago");

    let response = harness
        .run(
            r#"{ posts(username: "wanderer") { postTitle username author { username } } }"#,
            json!({}),
            None,
        )
        .await;
    let posts = &data(response)["posts"];
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["author"]["username"], "wanderer");

    let delete = r#"mutation($id: ID!) { deletePost(postId: $id) }"#;
    let response = harness
        .run(delete, json!({ "id": post_id }), Some(&nomad.token))
        .await;
    let (_, code) = first_error(&response);
    assert_eq!(code.as_deref(), Some("FORBIDDEN"));

    let response = harness
        .run(delete, json!({ "id": post_id }), Some(&wanderer.token))
        .await;
    assert_eq!(data(response)["deletePost"], "Post successfully deleted");

    let response = harness
        .run("{ me { posts { _id } } }", json!({}), Some(&wanderer.token))
        .await;
    assert_eq!(data(response)["me"]["posts"], json!([]));

    let response = harness
        .run(
            r#"query($id: ID!) { post(_id: $id) { _id } }"#,
            json!({ "id": post_id }),
            None,
        )
        .await;
    let (message, code) = first_error(&response);
    assert_eq!(message, "Post not found");
    assert_eq!(code.as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_like_post_toggles() {
    let harness = Harness::new();
    let wanderer = harness.sign_up("wanderer").await;
    let nomad = harness.sign_up("nomad").await;
    let post_id = harness.add_post(&wanderer, "Porto").await;

    let like = r#"mutation($id: ID!) { likePost(postId: $id) { likeCount likes { username } } }"#;

    let response = harness
        .run(like, json!({ "id": post_id }), Some(&nomad.token))
        .await;
    let post = &data(response)["likePost"];
    assert_eq!(post["likeCount"], 1);
    assert_eq!(post["likes"][0]["username"], "nomad");

    let response = harness
        .run(like, json!({ "id": post_id }), Some(&nomad.token))
        .await;
    assert_eq!(data(response)["likePost"]["likeCount"], 0);
}

#[tokio::test]
async fn test_delete_comment_requires_author() {
    let harness = Harness::new();
    let wanderer = harness.sign_up("wanderer").await;
    let nomad = harness.sign_up("nomad").await;
    let post_id = harness.add_post(&wanderer, "Porto").await;

    let response = harness
        .run(
            r#"mutation($id: ID!) { addComment(postId: $id, commentBody: "Lovely") { comments { _id } } }"#,
            json!({ "id": post_id }),
            Some(&nomad.token),
        )
        .await;
    let comment_id = data(response)["addComment"]["comments"][0]["_id"]
        .as_str()
        .unwrap()
        .to_string();

    let delete = r#"mutation($post: ID!, $comment: ID!) {
        deleteComment(postId: $post, commentId: $comment) { commentCount }
    }"#;
    let variables = json!({ "post": post_id, "comment": comment_id });

    let response = harness
        .run(delete, variables.clone(), Some(&wanderer.token))
        .await;
    let (_, code) = first_error(&response);
    assert_eq!(code.as_deref(), Some("FORBIDDEN"));

    let response = harness.run(delete, variables, Some(&nomad.token)).await;
    assert_eq!(data(response)["deleteComment"]["commentCount"], 0);
}

// ============================================================================
// FRIENDS AND PLACES
// ============================================================================

#[tokio::test]
async fn test_add_friend_is_idempotent() {
    let harness = Harness::new();
    let wanderer = harness.sign_up("wanderer").await;
    let nomad = harness.sign_up("nomad").await;

    let add = r#"mutation($id: ID!) { addFriend(friendId: $id) { friendCount friends { username } } }"#;
    harness
        .run(add, json!({ "id": nomad.id }), Some(&wanderer.token))
        .await;
    let response = harness
        .run(add, json!({ "id": nomad.id }), Some(&wanderer.token))
        .await;

    let user = &data(response)["addFriend"];
    assert_eq!(user["friendCount"], 1);
    assert_eq!(user["friends"], json!([{ "username": "nomad" }]));

    let response = harness
        .run(
            r#"mutation($id: ID!) { removeFriend(friendId: $id) { friendCount } }"#,
            json!({ "id": nomad.id }),
            Some(&wanderer.token),
        )
        .await;
    assert_eq!(data(response)["removeFriend"]["friendCount"], 0);
}

#[tokio::test]
async fn test_save_and_remove_place() {
    let harness = Harness::new();
    let wanderer = harness.sign_up("wanderer").await;
    harness
        .store
        .places
        .upsert(&NewPlace {
            place_id: "belem-tower".into(),
            place_name: Some("Belem Tower".into()),
            description: None,
            rating: Some("4.6".into()),
            tags: None,
            thumbnail_url: Some("https://img.example.com/belem.jpg".into()),
        })
        .await
        .unwrap();

    let response = harness
        .run(
            r#"mutation { savePlace(placeId: "belem-tower") { savedPlaces { placeId placeName thumbnail_url } } }"#,
            json!({}),
            Some(&wanderer.token),
        )
        .await;
    let saved = &data(response)["savePlace"]["savedPlaces"];
    assert_eq!(saved[0]["placeName"], "Belem Tower");
    assert_eq!(saved[0]["thumbnail_url"], "https://img.example.com/belem.jpg");

    let response = harness
        .run(
            r#"mutation { removePlace(placeId: "belem-tower") { savedPlaces { placeId } } }"#,
            json!({}),
            Some(&wanderer.token),
        )
        .await;
    assert_eq!(data(response)["removePlace"]["savedPlaces"], json!([]));

    let response = harness
        .run(
            r#"mutation { savePlace(placeId: "atlantis") { username } }"#,
            json!({}),
            Some(&wanderer.token),
        )
        .await;
    let (message, code) = first_error(&response);
    assert_eq!(message, "Place not found");
    assert_eq!(code.as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_public_user_queries() {
    let harness = Harness::new();
    harness.sign_up("wanderer").await;
    harness.sign_up("nomad").await;

    let response = harness.run("{ users { username } }", json!({}), None).await;
    assert_eq!(data(response)["users"].as_array().unwrap().len(), 2);

    let response = harness
        .run(r#"{ user(username: "ghost") { username } }"#, json!({}), None)
        .await;
    assert_eq!(data(response)["user"], Value::Null);
}
