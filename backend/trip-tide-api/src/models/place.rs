use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{trim_in_place, trim_optional};

/// Place document stored in the `places` collection
///
/// `place_id` is the external catalogue identifier clients refer to; `id` is
/// what users store in `savedPlaces`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(
        rename = "thumbnail_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<String>,
}

impl Place {
    pub fn new(input: NewPlace) -> Self {
        Self {
            id: ObjectId::new(),
            place_id: input.place_id,
            place_name: input.place_name,
            description: input.description,
            rating: input.rating,
            tags: input.tags,
            thumbnail_url: input.thumbnail_url,
        }
    }
}

/// Catalogue entry as found in seed files
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPlace {
    #[validate(length(min = 1, message = "Place id is required"))]
    pub place_id: String,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(rename = "thumbnail_url", default)]
    #[validate(custom(function = "crate::models::validation::validate_thumbnail_url"))]
    pub thumbnail_url: Option<String>,
}

impl NewPlace {
    pub fn normalize(mut self) -> Self {
        trim_in_place(&mut self.place_id);
        self.place_name = trim_optional(self.place_name);
        self.description = trim_optional(self.description);
        self.rating = trim_optional(self.rating);
        self.tags = trim_optional(self.tags);
        self.thumbnail_url = trim_optional(self.thumbnail_url);
        self
    }
}
