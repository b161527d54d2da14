use crate::models::domain::{DistanceUnit, Gender, RelationshipStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body for creating or partially updating a profile
///
/// Every field is optional; only those present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[validate(range(min = 100, max = 250))]
    #[serde(alias = "heightCm")]
    pub height: Option<u16>,
    #[validate(range(min = 30, max = 300))]
    #[serde(alias = "weightKg")]
    pub weight: Option<u16>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub relationship_status: Option<RelationshipStatus>,
    pub interests: Option<Vec<String>>,
    pub is_visible: Option<bool>,
}

impl UpdateProfileRequest {
    pub fn has_basic_info(&self) -> bool {
        self.date_of_birth.is_some()
            || self.gender.is_some()
            || self.height.is_some()
            || self.weight.is_some()
            || self.location.is_some()
    }

    pub fn has_professional_info(&self) -> bool {
        self.occupation.is_some() || self.education.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddInterestRequest {
    #[validate(length(min = 1, max = 64))]
    pub interest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DealBreakerRequest {
    #[validate(length(min = 1, max = 64))]
    pub deal_breaker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "photo")]
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPhotosRequest {
    pub photo_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenderPreferencesRequest {
    pub genders: Vec<Gender>,
}

/// Age bounds are range-checked by the aggregate, not here, so that
/// ordering errors and bound errors surface the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeRangeRequest {
    pub min_age: u32,
    pub max_age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRequest {
    pub max_distance: u32,
    #[serde(default)]
    pub unit: DistanceUnit,
}

/// Body for creating or partially updating preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub preferred_genders: Option<Vec<Gender>>,
    #[validate(range(min = 18, max = 99))]
    pub min_age: Option<u32>,
    #[validate(range(min = 18, max = 99))]
    pub max_age: Option<u32>,
    #[validate(range(min = 1, max = 1000))]
    pub max_distance: Option<u32>,
    pub distance_unit: Option<DistanceUnit>,
    pub preferred_interests: Option<Vec<String>>,
    pub deal_breakers: Option<Vec<String>>,
    pub show_only_verified_profiles: Option<bool>,
    pub show_only_with_photos: Option<bool>,
    pub allow_messages_from_matches: Option<bool>,
    pub allow_messages_from_everyone: Option<bool>,
    pub show_online_status: Option<bool>,
    pub show_last_seen: Option<bool>,
    pub push_notifications: Option<bool>,
    pub email_notifications: Option<bool>,
    pub match_notifications: Option<bool>,
    pub message_notifications: Option<bool>,
    pub like_notifications: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationQuery {
    #[validate(length(min = 1, max = 200))]
    pub location: String,
}

/// Comma-separated interest tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestsQuery {
    pub interests: String,
}

impl InterestsQuery {
    pub fn tags(&self) -> Vec<String> {
        split_list(&self.interests)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Query parameters for discovery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    /// Comma-separated user ids known to be verified
    #[serde(default)]
    pub verified: Option<String>,
}

impl DiscoverQuery {
    pub fn verified_ids(&self) -> Vec<String> {
        self.verified.as_deref().map(split_list).unwrap_or_default()
    }
}
