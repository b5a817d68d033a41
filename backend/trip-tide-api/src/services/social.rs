use error_types::{ServiceError, ServiceResult};
use tracing::debug;

use super::parse_id;
use crate::middleware::Viewer;
use crate::models::{Place, User};
use crate::store::{Store, UserRefList};

/// Friend lists and saved places
#[derive(Clone)]
pub struct SocialService {
    store: Store,
}

impl SocialService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Add-to-set on the viewer's friends; adding twice is a no-op
    pub async fn add_friend(&self, viewer: &Viewer, friend_id: &str) -> ServiceResult<User> {
        let friend = parse_id(friend_id, "User")?;
        if friend == viewer.id {
            return Err(ServiceError::invalid("You cannot add yourself as a friend"));
        }

        if self.store.users.find_by_id(friend).await?.is_none() {
            return Err(ServiceError::not_found("User", friend_id));
        }

        let user = self
            .store
            .users
            .add_ref(viewer.id, UserRefList::Friends, friend)
            .await?;
        debug!(user_id = %viewer.id, friend_id = %friend, "Friend added");
        viewer_or_missing(user, viewer)
    }

    pub async fn remove_friend(&self, viewer: &Viewer, friend_id: &str) -> ServiceResult<User> {
        let friend = parse_id(friend_id, "User")?;

        let user = self
            .store
            .users
            .pull_ref(viewer.id, UserRefList::Friends, friend)
            .await?;
        debug!(user_id = %viewer.id, friend_id = %friend, "Friend removed");
        viewer_or_missing(user, viewer)
    }

    /// Save a catalogue place, looked up by its external id
    pub async fn save_place(&self, viewer: &Viewer, place_id: &str) -> ServiceResult<User> {
        let place = self.find_place(place_id).await?;

        let user = self
            .store
            .users
            .add_ref(viewer.id, UserRefList::SavedPlaces, place.id)
            .await?;
        viewer_or_missing(user, viewer)
    }

    pub async fn remove_place(&self, viewer: &Viewer, place_id: &str) -> ServiceResult<User> {
        let place = self.find_place(place_id).await?;

        let user = self
            .store
            .users
            .pull_ref(viewer.id, UserRefList::SavedPlaces, place.id)
            .await?;
        viewer_or_missing(user, viewer)
    }

    async fn find_place(&self, place_id: &str) -> ServiceResult<Place> {
        self.store
            .places
            .find_by_place_id(place_id.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("Place", place_id))
    }
}

/// The viewer's account can disappear while their token is still valid
fn viewer_or_missing(user: Option<User>, viewer: &Viewer) -> ServiceResult<User> {
    user.ok_or_else(|| ServiceError::not_found("User", viewer.id.to_hex()))
}
