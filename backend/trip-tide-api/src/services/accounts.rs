use crypto_core::{hash_password, verify_password, JwtKeys, TokenSubject};
use error_types::{ServiceError, ServiceResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::parse_id;
use crate::middleware::Viewer;
use crate::models::validation::validate_input;
use crate::models::{NewUserInput, ProfileUpdate, User};
use crate::store::Store;

const INCORRECT_CREDENTIALS: &str = "Incorrect credentials";
const NO_PERMISSION: &str = "You do not have permission to do that";

/// A signed token together with the account it was issued for
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Registration, login and profile management
#[derive(Clone)]
pub struct AccountService {
    store: Store,
    keys: Arc<JwtKeys>,
}

impl AccountService {
    pub fn new(store: Store, keys: Arc<JwtKeys>) -> Self {
        Self { store, keys }
    }

    pub async fn register(&self, input: NewUserInput) -> ServiceResult<AuthPayload> {
        let input = input.normalize();
        validate_input(&input)?;

        let password_hash = hash_off_thread(input.password.clone()).await?;
        let user = User::new(input, password_hash);
        self.store.users.create(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.authenticate(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthPayload> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.store.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ServiceError::unauthenticated(INCORRECT_CREDENTIALS));
        };

        if !verify_off_thread(password.to_string(), user.password.clone()).await? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ServiceError::unauthenticated(INCORRECT_CREDENTIALS));
        }

        info!(user_id = %user.id, "User logged in");
        self.authenticate(user)
    }

    /// Apply `update` to the viewer's own account and reissue their token
    pub async fn update_profile(
        &self,
        viewer: &Viewer,
        user_id: &str,
        update: ProfileUpdate,
    ) -> ServiceResult<AuthPayload> {
        let target = parse_id(user_id, "User")?;
        if target != viewer.id {
            return Err(ServiceError::forbidden(NO_PERMISSION));
        }

        let mut update = update.normalize();
        validate_input(&update)?;

        if let Some(password) = update.password.take() {
            update.password = Some(hash_off_thread(password).await?);
        }

        let user = self
            .store
            .users
            .update_profile(target, &update)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        info!(user_id = %user.id, "Profile updated");
        self.authenticate(user)
    }

    pub async fn me(&self, viewer: &Viewer) -> ServiceResult<User> {
        self.store
            .users
            .find_by_id(viewer.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", viewer.id.to_hex()))
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        self.store.users.list().await
    }

    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        self.store.users.find_by_username(username.trim()).await
    }

    fn authenticate(&self, user: User) -> ServiceResult<AuthPayload> {
        let user_id = user.id.to_hex();
        let token = self
            .keys
            .issue_token(&TokenSubject {
                user_id: &user_id,
                username: &user.username,
                email: &user.email,
            })
            .map_err(ServiceError::internal)?;

        Ok(AuthPayload { token, user })
    }
}

async fn hash_off_thread(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(ServiceError::internal)?
        .map_err(ServiceError::internal)
}

async fn verify_off_thread(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(ServiceError::internal)?
        .map_err(ServiceError::internal)
}
